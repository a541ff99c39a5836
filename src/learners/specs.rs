use crate::{
    model::{Model, World},
    utils::CancellationToken,
};
use anyhow::Result;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// The outcome of a learning run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum LearningStatus {
    /// The model was updated with the learned operators.
    #[strum(serialize = "completed")]
    Completed,
    /// The run was cancelled; the model was left untouched.
    #[strum(serialize = "cancelled")]
    Cancelled,
}

/// A trait for action model learners.
///
/// A learner takes a model whose operators may lack their preconditions and effects,
/// and a set of worlds containing observed plans.
/// On success, the operators of the model are updated.
/// On failure or cancellation, the model is left untouched.
pub trait Learner {
    /// Learns the operators of the model from the plans of the worlds.
    fn learn(
        &mut self,
        model: &mut Model,
        worlds: &[World],
        token: &CancellationToken,
    ) -> Result<LearningStatus>;
}

/// The available learning algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, EnumString, IntoStaticStr)]
pub enum LearningAlgorithm {
    /// Reduction to weighted MAX-SAT.
    #[strum(serialize = "arms")]
    Arms,
    /// State machine induction.
    #[strum(serialize = "locm2")]
    Locm2,
}
