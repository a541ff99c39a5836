use super::{Learner, LearningStatus};
use crate::{
    model::{Model, World},
    utils::CancellationToken,
};
use anyhow::{anyhow, Result};
use log::info;
use std::thread::JoinHandle;

/// A learning run executed by a worker thread.
///
/// The run can be cancelled through the token it was started with, or by [`cancel`](Self::cancel).
pub struct LearningHandle {
    token: CancellationToken,
    handle: JoinHandle<Result<(Model, LearningStatus)>>,
}

impl LearningHandle {
    /// Requests the cancellation of the run.
    pub fn cancel(&self) {
        self.token.cancel()
    }

    /// Returns `true` iff the worker thread has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the end of the run and returns the model with its learning status.
    ///
    /// In case the run was cancelled, the returned model is the one that was given to the learner.
    pub fn join(self) -> Result<(Model, LearningStatus)> {
        self.handle
            .join()
            .map_err(|_| anyhow!("the learning thread panicked"))?
    }
}

/// Runs a learner on a dedicated thread.
///
/// # Example
///
/// ```
/// # use amlearn::learners::{run_in_background, LearningStatus};
/// # use amlearn::locm2::Locm2Learner;
/// # use amlearn::model::Model;
/// # use amlearn::utils::CancellationToken;
/// let token = CancellationToken::default();
/// token.cancel();
/// let handle = run_in_background(Box::new(Locm2Learner::new()), Model::new("m"), vec![], token);
/// assert!(handle.join().is_err());
/// ```
pub fn run_in_background(
    mut learner: Box<dyn Learner + Send>,
    mut model: Model,
    worlds: Vec<World>,
    token: CancellationToken,
) -> LearningHandle {
    let thread_token = token.clone();
    let handle = std::thread::spawn(move || -> Result<(Model, LearningStatus)> {
        let status = learner.learn(&mut model, &worlds, &thread_token)?;
        info!("learning run ended with status {}", status.as_ref());
        Ok((model, status))
    });
    LearningHandle { token, handle }
}
