use super::{Assignment, Formula, Literal, Variable};
use crate::utils::{CancellationToken, LearnerConfig};
use rand::{Rng, RngCore};

const EPSILON: f64 = 1e-9;

/// The parameters shared by the local search heuristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSearchParams {
    /// Number of restarts from random assignments.
    pub max_restarts: usize,
    /// Number of steps without improvement ending a restart.
    pub max_non_improving_steps: usize,
    /// Maximal number of flips of a restart.
    pub max_flips: usize,
    /// Probability of a random flip.
    pub random_flip_probability: f64,
}

impl From<&LearnerConfig> for LocalSearchParams {
    fn from(config: &LearnerConfig) -> Self {
        Self {
            max_restarts: config.max_restarts,
            max_non_improving_steps: config.max_non_improving_steps,
            max_flips: config.max_flips,
            random_flip_probability: config.random_flip_probability,
        }
    }
}

impl Default for LocalSearchParams {
    fn default() -> Self {
        Self::from(&LearnerConfig::default())
    }
}

/// Occurrence lists of a formula, computed once per solving call.
pub(crate) struct FormulaIndex {
    occurrences: Vec<Vec<usize>>,
    neighbors: Vec<Vec<usize>>,
    clause_vars: Vec<Vec<usize>>,
}

impl FormulaIndex {
    pub(crate) fn new(formula: &Formula) -> Self {
        let mut occurrences = vec![vec![]; formula.n_vars()];
        let mut clause_vars = Vec::with_capacity(formula.clauses().len());
        for (i, c) in formula.clauses().iter().enumerate() {
            let mut vars = c
                .terms()
                .iter()
                .flatten()
                .map(|l| l.var().index())
                .collect::<Vec<usize>>();
            vars.sort_unstable();
            vars.dedup();
            vars.iter().for_each(|v| occurrences[*v].push(i));
            clause_vars.push(vars);
        }
        let neighbors = occurrences
            .iter()
            .map(|occ| {
                let mut n = occ
                    .iter()
                    .flat_map(|c| clause_vars[*c].iter().copied())
                    .collect::<Vec<usize>>();
                n.sort_unstable();
                n.dedup();
                n
            })
            .collect();
        Self {
            occurrences,
            neighbors,
            clause_vars,
        }
    }
}

/// The state of a local search: an assignment and the data needed to compute flip gains incrementally.
pub(crate) struct SearchState<'a> {
    formula: &'a Formula,
    index: &'a FormulaIndex,
    values: Vec<bool>,
    false_counts: Vec<Vec<usize>>,
    true_terms: Vec<usize>,
    satisfied_weight: f64,
    group_sizes: Vec<usize>,
    clause_deltas: Vec<f64>,
    unsat: Vec<usize>,
    unsat_positions: Vec<Option<usize>>,
}

impl<'a> SearchState<'a> {
    pub(crate) fn new(formula: &'a Formula, index: &'a FormulaIndex, values: Vec<bool>) -> Self {
        let mut state = Self {
            formula,
            index,
            values,
            false_counts: Vec::with_capacity(formula.clauses().len()),
            true_terms: Vec::with_capacity(formula.clauses().len()),
            satisfied_weight: 0.,
            group_sizes: vec![0; formula.n_groups()],
            clause_deltas: vec![0.; formula.n_vars()],
            unsat: vec![],
            unsat_positions: vec![None; formula.clauses().len()],
        };
        for (i, c) in formula.clauses().iter().enumerate() {
            let counts = c
                .terms()
                .iter()
                .map(|t| t.iter().filter(|l| !state.literal_value(**l)).count())
                .collect::<Vec<usize>>();
            let n_true = counts.iter().filter(|n| **n == 0).count();
            if n_true > 0 {
                state.satisfied_weight += c.weight();
            } else {
                state.unsat_positions[i] = Some(state.unsat.len());
                state.unsat.push(i);
            }
            state.false_counts.push(counts);
            state.true_terms.push(n_true);
        }
        for v in 0..formula.n_vars() {
            if state.values[v] {
                if let Some(g) = formula.group_of(Variable::from(v + 1)) {
                    state.group_sizes[g] += 1;
                }
            }
        }
        for v in 0..formula.n_vars() {
            state.clause_deltas[v] = state.compute_clause_delta(v);
        }
        state
    }

    pub(crate) fn new_random(
        formula: &'a Formula,
        index: &'a FormulaIndex,
        rng: &mut dyn RngCore,
    ) -> Self {
        let values = (0..formula.n_vars()).map(|_| rng.gen_bool(0.5)).collect();
        Self::new(formula, index, values)
    }

    fn literal_value(&self, l: Literal) -> bool {
        self.values[l.var().index()] == l.is_positive()
    }

    fn compute_clause_delta(&self, var: usize) -> f64 {
        self.index.occurrences[var]
            .iter()
            .map(|c| {
                let clause = &self.formula.clauses()[*c];
                let sat_before = self.true_terms[*c] > 0;
                let sat_after = clause.terms().iter().enumerate().any(|(t, lits)| {
                    let mut count = self.false_counts[*c][t];
                    for l in lits.iter().filter(|l| l.var().index() == var) {
                        if self.literal_value(*l) {
                            count += 1;
                        } else {
                            count -= 1;
                        }
                    }
                    count == 0
                });
                match (sat_before, sat_after) {
                    (false, true) => clause.weight(),
                    (true, false) => -clause.weight(),
                    _ => 0.,
                }
            })
            .sum()
    }

    fn penalty_delta(&self, var: usize) -> f64 {
        let group = match self.formula.group_of(Variable::from(var + 1)) {
            Some(g) => g,
            None => return 0.,
        };
        let bound = self.formula.size_bound();
        let size = self.group_sizes[group];
        let new_size = if self.values[var] { size - 1 } else { size + 1 };
        match (size > bound, new_size > bound) {
            (false, true) => -self.formula.size_penalty(),
            (true, false) => self.formula.size_penalty(),
            _ => 0.,
        }
    }

    /// Returns the change of value a flip of the variable (0-based) would produce.
    pub(crate) fn delta(&self, var: usize) -> f64 {
        self.clause_deltas[var] + self.penalty_delta(var)
    }

    /// Returns the current value.
    pub(crate) fn value(&self) -> f64 {
        let bound = self.formula.size_bound();
        let n_exceeding = self.group_sizes.iter().filter(|s| **s > bound).count();
        self.satisfied_weight - self.formula.size_penalty() * n_exceeding as f64
    }

    /// Returns the variables (0-based) of a clause.
    pub(crate) fn clause_vars(&self, clause: usize) -> &'a [usize] {
        let index: &'a FormulaIndex = self.index;
        &index.clause_vars[clause]
    }

    pub(crate) fn unsat_clauses(&self) -> &[usize] {
        &self.unsat
    }

    /// Flips a variable (0-based), updating the clause counters and the cached gains of its neighbors.
    pub(crate) fn flip(&mut self, var: usize) {
        let was_true = self.values[var];
        if let Some(g) = self.formula.group_of(Variable::from(var + 1)) {
            if was_true {
                self.group_sizes[g] -= 1;
            } else {
                self.group_sizes[g] += 1;
            }
        }
        let index = self.index;
        let formula = self.formula;
        for c in index.occurrences[var].iter() {
            let clause = &formula.clauses()[*c];
            let sat_before = self.true_terms[*c] > 0;
            let mut n_true = 0;
            for (t, lits) in clause.terms().iter().enumerate() {
                for l in lits.iter().filter(|l| l.var().index() == var) {
                    if self.values[var] == l.is_positive() {
                        self.false_counts[*c][t] += 1;
                    } else {
                        self.false_counts[*c][t] -= 1;
                    }
                }
                if self.false_counts[*c][t] == 0 {
                    n_true += 1;
                }
            }
            self.true_terms[*c] = n_true;
            match (sat_before, n_true > 0) {
                (false, true) => {
                    self.satisfied_weight += clause.weight();
                    self.remove_unsat(*c);
                }
                (true, false) => {
                    self.satisfied_weight -= clause.weight();
                    self.unsat_positions[*c] = Some(self.unsat.len());
                    self.unsat.push(*c);
                }
                _ => {}
            }
        }
        self.values[var] = !was_true;
        for n in index.neighbors[var].iter() {
            self.clause_deltas[*n] = self.compute_clause_delta(*n);
        }
    }

    fn remove_unsat(&mut self, clause: usize) {
        if let Some(pos) = self.unsat_positions[clause].take() {
            self.unsat.swap_remove(pos);
            if let Some(moved) = self.unsat.get(pos) {
                self.unsat_positions[*moved] = Some(pos);
            }
        }
    }

    /// Returns the variable with the best gain, breaking ties at random.
    pub(crate) fn best_var<I>(&self, candidates: I, rng: &mut dyn RngCore) -> Option<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut best = None;
        let mut best_delta = f64::NEG_INFINITY;
        let mut n_ties = 0;
        for v in candidates {
            let d = self.delta(v);
            if d > best_delta + EPSILON {
                best = Some(v);
                best_delta = d;
                n_ties = 1;
            } else if (d - best_delta).abs() <= EPSILON {
                n_ties += 1;
                if rng.gen_range(0..n_ties) == 0 {
                    best = Some(v);
                }
            }
        }
        best
    }

    /// Clears every true variable whose clearing does not decrease the value.
    pub(crate) fn simplify(&mut self, token: &CancellationToken) -> Option<()> {
        for v in 0..self.values.len() {
            token.check()?;
            if self.values[v] && self.delta(v) >= -EPSILON {
                self.flip(v);
            }
        }
        Some(())
    }

    pub(crate) fn to_assignment(&self) -> Assignment {
        Assignment::new(self.values.clone())
    }

    pub(crate) fn values(&self) -> &[bool] {
        &self.values
    }
}

/// The outcome of a restart: the best assignment found and its value.
pub(crate) struct RestartOutcome {
    pub(crate) values: Vec<bool>,
    pub(crate) value: f64,
}

/// Runs the restart loop shared by the local search heuristics.
///
/// The `step` closure performs one flip on the state; it returns `false` if no flip can be done.
/// Returns `None` on cancellation.
pub(crate) fn run_restarts<F>(
    formula: &Formula,
    params: &LocalSearchParams,
    rng: &mut dyn RngCore,
    token: &CancellationToken,
    mut step: F,
) -> Option<Assignment>
where
    F: FnMut(&mut SearchState, &mut dyn RngCore) -> bool,
{
    let index = FormulaIndex::new(formula);
    let max_value = formula.max_value();
    let mut best: Option<RestartOutcome> = None;
    for restart in 0..params.max_restarts.max(1) {
        token.check()?;
        let mut state = SearchState::new_random(formula, &index, rng);
        let mut restart_best = RestartOutcome {
            values: state.values().to_vec(),
            value: state.value(),
        };
        let mut non_improving = 0;
        for _ in 0..params.max_flips {
            token.check()?;
            if restart_best.value >= max_value - EPSILON {
                break;
            }
            if !step(&mut state, rng) {
                break;
            }
            if state.value() > restart_best.value + EPSILON {
                restart_best.values = state.values().to_vec();
                restart_best.value = state.value();
                non_improving = 0;
            } else {
                non_improving += 1;
                if non_improving >= params.max_non_improving_steps {
                    break;
                }
            }
        }
        log::trace!(
            "local search restart {} reached value {}",
            restart,
            restart_best.value
        );
        if best
            .as_ref()
            .map(|b| restart_best.value > b.value + EPSILON)
            .unwrap_or(true)
        {
            best = Some(restart_best);
        }
        if best.as_ref().map(|b| b.value).unwrap_or(f64::NEG_INFINITY) >= max_value - EPSILON {
            break;
        }
    }
    let best = best?;
    let mut state = SearchState::new(formula, &index, best.values);
    state.simplify(token)?;
    Some(state.to_assignment())
}

/// Picks the variable to flip among all the variables of the formula, as GSAT does.
pub(crate) fn random_or_best_var(
    state: &SearchState,
    n_vars: usize,
    random_flip_probability: f64,
    rng: &mut dyn RngCore,
) -> Option<usize> {
    if n_vars == 0 {
        return None;
    }
    if rng.gen_bool(random_flip_probability) {
        Some(rng.gen_range(0..n_vars))
    } else {
        state.best_var(0..n_vars, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn formula() -> Formula {
        let mut f = Formula::with_size_limit(1, 5.);
        let g = f.new_group();
        let a = f.new_var(Some(g));
        let b = f.new_var(Some(g));
        let c = f.new_var(None);
        f.add_clause(vec![a.positive(), c.positive()], 2.);
        f.add_clause(vec![b.negative()], 1.);
        f.add_multiclause(
            vec![vec![a.positive(), b.positive()], vec![c.negative()]],
            3.,
        );
        f
    }

    #[test]
    fn test_incremental_value_matches_full_evaluation() {
        let f = formula();
        let index = FormulaIndex::new(&f);
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = SearchState::new(&f, &index, vec![false, false, false]);
        for _ in 0..100 {
            let v = rng.gen_range(0..3);
            let expected = f.value(&state.to_assignment()) + state.delta(v);
            state.flip(v);
            let full = f.value(&state.to_assignment());
            assert!((full - state.value()).abs() < 1e-9);
            assert!((full - expected).abs() < 1e-9);
            let n_unsat = f
                .clauses()
                .iter()
                .filter(|c| !c.is_satisfied_by(&state.to_assignment()))
                .count();
            assert_eq!(n_unsat, state.unsat_clauses().len());
        }
    }

    #[test]
    fn test_simplify() {
        let mut f = Formula::default();
        let a = f.new_var(None);
        let b = f.new_var(None);
        f.add_clause(vec![a.positive()], 1.);
        f.add_clause(vec![a.positive(), b.positive()], 1.);
        let index = FormulaIndex::new(&f);
        let mut state = SearchState::new(&f, &index, vec![true, true]);
        state.simplify(&CancellationToken::default()).unwrap();
        assert_eq!(&[true, false], state.values());
    }

    #[test]
    fn test_best_var() {
        let mut f = Formula::default();
        let a = f.new_var(None);
        let b = f.new_var(None);
        f.add_clause(vec![a.positive()], 1.);
        f.add_clause(vec![b.positive()], 2.);
        let index = FormulaIndex::new(&f);
        let state = SearchState::new(&f, &index, vec![false, false]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Some(1), state.best_var(0..2, &mut rng));
        assert_eq!(None, state.best_var(0..0, &mut rng));
    }
}
