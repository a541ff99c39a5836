//! amlearn learns the preconditions and effects of planning operators from observed plans.
//!
//! Two learners are available:
//! [`ArmsLearner`](arms::ArmsLearner), which reduces the learning problem to weighted MAX-SAT
//! solved by local search, and [`Locm2Learner`](locm2::Locm2Learner), which induces a state machine per object type.

#![warn(missing_docs)]

pub mod arms;

pub mod io;

pub mod learners;

pub mod locm2;

pub mod model;

pub mod sat;

pub mod transition;

pub mod utils;
