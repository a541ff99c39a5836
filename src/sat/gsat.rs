use super::{
    local_search::{self, LocalSearchParams},
    specs::{notify_end, notify_start},
    Assignment, Formula, MaxSatSolver, SolvingListener,
};
use crate::utils::CancellationToken;
use rand::RngCore;

/// The GSAT local search.
///
/// Each restart begins with a random assignment.
/// At each step, the variable whose flip gives the best value is flipped,
/// except with a small probability where a random variable is flipped instead.
///
/// # Example
///
/// ```
/// # use amlearn::sat::{Formula, Gsat, MaxSatSolver};
/// # use amlearn::utils::CancellationToken;
/// # use rand::{rngs::StdRng, SeedableRng};
/// let mut formula = Formula::default();
/// let x = formula.new_var(None);
/// let y = formula.new_var(None);
/// formula.add_clause(vec![x.positive()], 2.);
/// formula.add_clause(vec![x.negative(), y.positive()], 1.);
/// let mut solver = Gsat::default();
/// let mut rng = StdRng::seed_from_u64(0);
/// let assignment = solver.solve(&formula, &mut rng, &CancellationToken::default()).unwrap();
/// assert_eq!(3., formula.value(&assignment));
/// ```
#[derive(Default)]
pub struct Gsat {
    params: LocalSearchParams,
    listeners: Vec<Box<dyn SolvingListener + Send>>,
}

impl Gsat {
    /// Builds a new GSAT solver.
    pub fn new(params: LocalSearchParams) -> Self {
        Self {
            params,
            listeners: vec![],
        }
    }
}

impl MaxSatSolver for Gsat {
    fn solve(
        &mut self,
        formula: &Formula,
        rng: &mut dyn RngCore,
        token: &CancellationToken,
    ) -> Option<Assignment> {
        notify_start(&self.listeners, formula);
        let n_vars = formula.n_vars();
        let p = self.params.random_flip_probability;
        let result = local_search::run_restarts(formula, &self.params, rng, token, |state, rng| {
            match local_search::random_or_best_var(state, n_vars, p, rng) {
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
