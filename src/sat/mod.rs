//! Weighted MAX-SAT formulas and local search solvers.

mod formula;
pub use formula::Assignment;
pub use formula::Formula;
pub use formula::Literal;
pub use formula::Variable;
pub use formula::WeightedClause;

mod gsat;
pub use gsat::Gsat;

mod local_search;
pub use local_search::LocalSearchParams;

mod specs;
pub use specs::new_solver;
pub use specs::MaxSatSolver;
pub use specs::SolvingListener;
pub use specs::SolvingLogger;

mod walksat;
pub use walksat::WalkSat;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::CancellationToken;
    use paste::paste;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::{Arc, Mutex};

    fn satisfiable_formula() -> Formula {
        let mut f = Formula::default();
        let vars = (0..6).map(|_| f.new_var(None)).collect::<Vec<Variable>>();
        f.add_clause(vec![vars[0].positive(), vars[1].positive()], 2.);
        f.add_clause(vec![vars[0].negative(), vars[2].positive()], 1.);
        f.add_clause(vec![vars[1].negative(), vars[3].negative()], 3.);
        f.add_clause(vec![vars[3].positive(), vars[4].positive()], 1.5);
        f.add_clause(vec![vars[4].negative(), vars[5].positive()], 2.);
        f.add_multiclause(
            vec![
                vec![vars[2].positive(), vars[5].positive()],
                vec![vars[0].negative()],
            ],
            4.,
        );
        f
    }

    struct RecordingListener(Arc<Mutex<Vec<String>>>);

    impl SolvingListener for RecordingListener {
        fn solving_start(&self, n_vars: usize, n_clauses: usize, _max_value: f64) {
            self.0
                .lock()
                .unwrap()
                .push(format!("start {} {}", n_vars, n_clauses));
        }

        fn solving_end(&self, value: Option<f64>) {
            self.0.lock().unwrap().push(format!("end {:?}", value));
        }
    }

    macro_rules! solver_tests {
        ($solver: ident) => {
            paste! {
                #[test]
                fn [<test_ $solver:lower _reaches_max_value>]() {
                    let formula = satisfiable_formula();
                    let mut n_optimal = 0;
                    for seed in 0..20 {
                        let mut solver = $solver::default();
                        let mut rng = StdRng::seed_from_u64(seed);
                        let assignment = solver
                            .solve(&formula, &mut rng, &CancellationToken::default())
                            .unwrap();
                        assert_eq!(formula.n_vars(), assignment.len());
                        if formula.value(&assignment) == formula.max_value() {
                            n_optimal += 1;
                        }
                    }
                    assert!(n_optimal >= 15);
                }

                #[test]
                fn [<test_ $solver:lower _ignores_clauses_without_variables>]() {
                    let mut formula = Formula::default();
                    for i in 0..30 {
                        let v = formula.new_var(None);
                        let l = if i % 2 == 0 { v.positive() } else { v.negative() };
                        formula.add_clause(vec![l], 1.);
                    }
                    formula.add_clause(vec![], 1.);
                    let mut n_optimal = 0;
                    for seed in 0..20 {
                        let mut solver = $solver::default();
                        let mut rng = StdRng::seed_from_u64(seed);
                        let assignment = solver
                            .solve(&formula, &mut rng, &CancellationToken::default())
                            .unwrap();
                        if formula.value(&assignment) == 30. {
                            n_optimal += 1;
                        }
                    }
                    assert!(n_optimal >= 18);
                }

                #[test]
                fn [<test_ $solver:lower _cancelled>]() {
                    let formula = satisfiable_formula();
                    let token = CancellationToken::default();
                    token.cancel();
                    let mut solver = $solver::default();
                    let mut rng = StdRng::seed_from_u64(0);
                    assert!(solver.solve(&formula, &mut rng, &token).is_none());
                }

                #[test]
                fn [<test_ $solver:lower _empty_formula>]() {
                    let formula = Formula::default();
                    let mut solver = $solver::default();
                    let mut rng = StdRng::seed_from_u64(0);
                    let assignment = solver
                        .solve(&formula, &mut rng, &CancellationToken::default())
                        .unwrap();
                    assert!(assignment.is_empty());
                }

                #[test]
                fn [<test_ $solver:lower _prefers_small_assignments>]() {
                    let mut formula = Formula::default();
                    let a = formula.new_var(None);
                    let b = formula.new_var(None);
                    let c = formula.new_var(None);
                    formula.add_clause(vec![a.positive(), b.positive()], 1.);
                    formula.add_clause(vec![c.negative(), a.positive()], 1.);
                    for seed in 0..10 {
                        let mut solver = $solver::default();
                        let mut rng = StdRng::seed_from_u64(seed);
                        let assignment = solver
                            .solve(&formula, &mut rng, &CancellationToken::default())
                            .unwrap();
                        assert_eq!(2., formula.value(&assignment));
                        let n_true = (1..=3).filter(|v| assignment.value_of(*v)).count();
                        assert_eq!(1, n_true);
                    }
                }

                #[test]
                fn [<test_ $solver:lower _size_penalty>]() {
                    let mut formula = Formula::with_size_limit(1, 10.);
                    let g = formula.new_group();
                    let a = formula.new_var(Some(g));
                    let b = formula.new_var(Some(g));
                    formula.add_clause(vec![a.positive()], 5.);
                    formula.add_clause(vec![b.positive()], 3.);
                    let mut solver = $solver::default();
                    let mut rng = StdRng::seed_from_u64(1);
                    let assignment = solver
                        .solve(&formula, &mut rng, &CancellationToken::default())
                        .unwrap();
                    assert!(assignment.value_of(a));
                    assert!(!assignment.value_of(b));
                }

                #[test]
                fn [<test_ $solver:lower _listeners>]() {
                    let events = Arc::new(Mutex::new(vec![]));
                    let mut solver = $solver::default();
                    solver.add_listener(Box::new(RecordingListener(Arc::clone(&events))));
                    let formula = satisfiable_formula();
                    let mut rng = StdRng::seed_from_u64(0);
                    solver.solve(&formula, &mut rng, &CancellationToken::default());
                    let events = events.lock().unwrap();
                    assert_eq!(2, events.len());
                    assert_eq!("start 6 6", events[0]);
                    assert!(events[1].starts_with("end Some("));
                }
            }
        };
    }

    solver_tests!(Gsat);
    solver_tests!(WalkSat);

    #[test]
    fn test_new_solver() {
        let config = crate::utils::LearnerConfig::default();
        let mut solver = new_solver(&config);
        let formula = satisfiable_formula();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(solver
            .solve(&formula, &mut rng, &CancellationToken::default())
            .is_some());
    }
}
