//! The LOCM2 learner, based on the induction of a state machine per object type.

mod locm2_learner;
pub use locm2_learner::Locm2Learner;

mod rewriter;
pub use rewriter::Rewriter;

mod state_machine;
pub use state_machine::make_state_ids;
pub use state_machine::Role;
pub use state_machine::StateIds;
pub use state_machine::StateMachine;
pub use state_machine::StateParameter;

mod transition_matrix;
pub use transition_matrix::find_holes;
pub use transition_matrix::ObjectSequence;
pub use transition_matrix::Occurrence;
pub use transition_matrix::Transition;
pub use transition_matrix::TransitionMatrix;

mod transition_sets;
pub use transition_sets::find_transition_sets;
