//! Common interface of the learners and the background runner.

mod runner;
pub use runner::run_in_background;
pub use runner::LearningHandle;

mod specs;
pub use specs::Learner;
pub use specs::LearningAlgorithm;
pub use specs::LearningStatus;

use crate::{arms::ArmsLearner, locm2::Locm2Learner, utils::LearnerConfig};

/// Builds the learner implementing an algorithm.
///
/// The configuration is only used by the ARMS learner.
pub fn new_learner(
    algorithm: LearningAlgorithm,
    config: LearnerConfig,
) -> Box<dyn Learner + Send> {
    match algorithm {
        LearningAlgorithm::Arms => Box::new(ArmsLearner::new(config)),
        LearningAlgorithm::Locm2 => Box::new(Locm2Learner::new()),
    }
}
