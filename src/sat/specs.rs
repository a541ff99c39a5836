use super::{Assignment, Formula};
use crate::utils::{CancellationToken, LearnerConfig, LocalSearch};
use log::debug;
use rand::RngCore;

/// A trait for objects listening to the solving steps of a MAX-SAT solver.
pub trait SolvingListener {
    /// Called when a solving process starts.
    fn solving_start(&self, n_vars: usize, n_clauses: usize, max_value: f64);

    /// Called when a solving process ends.
    ///
    /// The value of the returned assignment is given, or `None` if the process was cancelled.
    fn solving_end(&self, value: Option<f64>);
}

/// A trait for weighted MAX-SAT solvers.
///
/// Solvers look for an assignment maximizing the value of the formula, that is the weight of the satisfied clauses minus the size penalties.
/// They are not required to find the optimal value.
pub trait MaxSatSolver {
    /// Solves the formula.
    ///
    /// `None` is returned iff the cancellation was requested during the search.
    fn solve(
        &mut self,
        formula: &Formula,
        rng: &mut dyn RngCore,
        token: &CancellationToken,
    ) -> Option<Assignment>;

    /// Adds a listener to this solver.
    fn add_listener(&mut self, listener: Box<dyn SolvingListener + Send>);
}

/// Builds the solver selected by the configuration.
pub fn new_solver(config: &LearnerConfig) -> Box<dyn MaxSatSolver + Send> {
    match config.local_search {
        LocalSearch::Gsat => Box::new(super::Gsat::new(config.into())),
        LocalSearch::WalkSat => Box::new(super::WalkSat::new(config.into())),
    }
}

/// A solving listener writing the solving steps into the logs.
#[derive(Default)]
pub struct SolvingLogger;

impl SolvingListener for SolvingLogger {
    fn solving_start(&self, n_vars: usize, n_clauses: usize, max_value: f64) {
        debug!(
            "launching local search on a formula with {} variables and {} clauses (max value is {})",
            n_vars, n_clauses, max_value
        );
    }

    fn solving_end(&self, value: Option<f64>) {
        match value {
            Some(v) => debug!("local search ended with value {}", v),
            None => debug!("local search was cancelled"),
        }
    }
}

pub(crate) fn notify_start(listeners: &[Box<dyn SolvingListener + Send>], formula: &Formula) {
    listeners.iter().for_each(|l| {
        l.solving_start(formula.n_vars(), formula.clauses().len(), formula.max_value())
    });
}

pub(crate) fn notify_end(
    listeners: &[Box<dyn SolvingListener + Send>],
    formula: &Formula,
    result: &Option<Assignment>,
) {
    let value = result.as_ref().map(|a| formula.value(a));
    listeners.iter().for_each(|l| l.solving_end(value));
}
