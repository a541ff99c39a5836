//! Evaluation of logical trees and application of actions to states.

mod transition_engine;
pub use transition_engine::apply_action;
pub use transition_engine::decode_effects;
pub use transition_engine::evaluate;
pub use transition_engine::ground_reference;
pub use transition_engine::is_applicable;
pub use transition_engine::resolve_binding;
