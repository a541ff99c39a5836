use super::{
    local_search::{self, LocalSearchParams},
    specs::{notify_end, notify_start},
    Assignment, Formula, MaxSatSolver, SolvingListener,
};
use crate::utils::CancellationToken;
use rand::{Rng, RngCore};

/// The WalkSat local search.
///
/// Each restart begins with a random assignment.
/// At each step, an unsatisfied clause is selected at random;
/// then, one of its variables is flipped: the one giving the best value, or a random one with a small probability.
/// Clauses without variables are never selected.
/// When no other clause is unsatisfied, the step falls back to a GSAT flip.
#[derive(Default)]
pub struct WalkSat {
    params: LocalSearchParams,
    listeners: Vec<Box<dyn SolvingListener + Send>>,
}

impl WalkSat {
    /// Builds a new WalkSat solver.
    pub fn new(params: LocalSearchParams) -> Self {
        Self {
            params,
            listeners: vec![],
        }
    }
}

impl MaxSatSolver for WalkSat {
    fn solve(
        &mut self,
        formula: &Formula,
        rng: &mut dyn RngCore,
        token: &CancellationToken,
    ) -> Option<Assignment> {
        notify_start(&self.listeners, formula);
        let p = self.params.random_flip_probability;
        let result = local_search::run_restarts(formula, &self.params, rng, token, |state, rng| {
            let flippable = state
                .unsat_clauses()
                .iter()
                .copied()
                .filter(|c| !state.clause_vars(*c).is_empty())
                .collect::<Vec<usize>>();
            let var = if flippable.is_empty() {
                local_search::random_or_best_var(state, formula.n_vars(), p, rng)
            } else {
                let vars = state.clause_vars(flippable[rng.gen_range(0..flippable.len())]);
                if rng.gen_bool(p) {
                    Some(vars[rng.gen_range(0..vars.len())])
                } else {
                    state.best_var(vars.iter().copied(), rng)
                }
            };
            match var {
                Some(v) => {
                    state.flip(v);
                    true
                }
                None => false,
            }
        });
        notify_end(&self.listeners, formula, &result);
        result
    }

    fn add_listener(&mut self, listener: Box<dyn SolvingListener + Send>) {
        self.listeners.push(listener);
    }
}
