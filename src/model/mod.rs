//! The planning data model shared by the learners.

mod domain_model;
pub use domain_model::Model;
pub use domain_model::Requirements;

mod operator;
pub use operator::Operator;
pub use operator::OperatorId;

mod plan;
pub use plan::Action;
pub use plan::Plan;
pub use plan::World;

mod predicate;
pub use predicate::Parameter;
pub use predicate::Predicate;
pub use predicate::PredicateId;

mod state;
pub use state::GroundPredicate;
pub use state::State;

mod tree;
pub use tree::Binding;
pub use tree::PredicateReference;
pub use tree::Tree;

mod types;
pub use types::Object;
pub use types::Type;
pub use types::TypeId;
