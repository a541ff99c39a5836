use super::knowledge::{FactKind, Knowledge};
use crate::{
    model::{GroundPredicate, Model, OperatorId, Plan},
    sat::{Formula, Literal, Variable},
    transition::ground_reference,
    utils::{CancellationToken, LearnerConfig},
};
use anyhow::Result;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// The variables attached to a candidate grounding of an undecided operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FactVars {
    pub(crate) pre: Variable,
    pub(crate) add: Variable,
    pub(crate) del: Variable,
}

impl FactVars {
    fn get(&self, kind: FactKind) -> Variable {
        match kind {
            FactKind::Precondition => self.pre,
            FactKind::Add => self.add,
            FactKind::Delete => self.del,
        }
    }
}

/// A formula and the variables of the candidate groundings of the undecided operators.
pub(crate) struct EncodedProblem {
    pub(crate) formula: Formula,
    vars: Vec<Vec<FactVars>>,
}

impl EncodedProblem {
    /// Returns the variables of a candidate, or `None` if the operator was not encoded.
    pub(crate) fn vars(&self, op: OperatorId, candidate: usize) -> Option<FactVars> {
        self.vars[op.index()].get(candidate).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FactLiteral {
    Known(bool),
    Unknown(Literal),
}

/// Translates the plans into a weighted MAX-SAT formula over the facts of the undecided operators.
pub(crate) struct ConstraintsEncoder<'a> {
    model: &'a Model,
    knowledge: &'a Knowledge,
    config: &'a LearnerConfig,
    token: &'a CancellationToken,
}

impl<'a> ConstraintsEncoder<'a> {
    pub(crate) fn new(
        model: &'a Model,
        knowledge: &'a Knowledge,
        config: &'a LearnerConfig,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            model,
            knowledge,
            config,
            token,
        }
    }

    /// Encodes the problem; `weights` gives the weight of each undecided operator.
    ///
    /// `None` is returned on cancellation.
    pub(crate) fn encode(
        &self,
        plans: &[Plan],
        weights: &[Option<u32>],
    ) -> Result<Option<EncodedProblem>> {
        let mut problem = EncodedProblem {
            formula: Formula::with_size_limit(self.config.size_bound, self.config.size_penalty),
            vars: vec![vec![]; self.model.n_operators()],
        };
        for op in self.knowledge.undecided() {
            let group = problem.formula.new_group();
            problem.vars[op.index()] = (0..self.knowledge.candidates(op).len())
                .map(|_| FactVars {
                    pre: problem.formula.new_var(Some(group)),
                    add: problem.formula.new_var(Some(group)),
                    del: problem.formula.new_var(Some(group)),
                })
                .collect();
        }
        macro_rules! encode_step {
            ($name: expr, $step: expr) => {
                let n_clauses = problem.formula.clauses().len();
                if $step.is_none() {
                    return Ok(None);
                }
                debug!(
                    "added {} {} constraint(s)",
                    problem.formula.clauses().len() - n_clauses,
                    $name
                );
            };
        }
        encode_step!(
            "action",
            self.encode_action_constraints(&mut problem, weights)
        );
        encode_step!(
            "information",
            self.encode_information_constraints(&mut problem, plans)?
        );
        encode_step!(
            "frequency",
            self.encode_frequency_constraints(&mut problem, plans)?
        );
        encode_step!("plan", self.encode_plan_constraints(&mut problem, plans)?);
        Ok(Some(problem))
    }

    fn encode_action_constraints(
        &self,
        problem: &mut EncodedProblem,
        weights: &[Option<u32>],
    ) -> Option<()> {
        for op in self.knowledge.undecided() {
            self.token.check()?;
            let weight = match weights[op.index()] {
                Some(w) => w as f64,
                None => continue,
            };
            for vars in problem.vars[op.index()].clone() {
                problem
                    .formula
                    .add_clause(vec![vars.add.negative(), vars.pre.negative()], weight);
                problem
                    .formula
                    .add_clause(vec![vars.del.negative(), vars.pre.positive()], weight);
            }
        }
        Some(())
    }

    fn encode_information_constraints(
        &self,
        problem: &mut EncodedProblem,
        plans: &[Plan],
    ) -> Result<Option<()>> {
        let weight = self.config.information_weight;
        for plan in plans.iter() {
            if self.token.check().is_none() {
                return Ok(None);
            }
            for k in 1..=plan.len() {
                let state = match &plan.states()[k] {
                    Some(s) => s,
                    None => continue,
                };
                let previous = &plan.actions()[k - 1];
                for p in state.iter() {
                    if !self.knowledge.is_decided(previous.operator()) {
                        for c in self
                            .knowledge
                            .matching_candidates(self.model, previous, p)?
                        {
                            let fact =
                                self.fact(problem, previous.operator(), c, FactKind::Delete, false);
                            self.add_terms(problem, vec![vec![fact]], weight);
                        }
                    }
                    let seen = plan.states()[..k].iter().flatten().any(|s| s.contains(p));
                    if seen {
                        continue;
                    }
                    let mut terms = vec![];
                    for a in plan.actions()[..k].iter() {
                        for c in self.knowledge.matching_candidates(self.model, a, p)? {
                            terms.push(vec![self.fact(
                                problem,
                                a.operator(),
                                c,
                                FactKind::Add,
                                true,
                            )]);
                        }
                    }
                    self.add_terms(problem, terms, weight);
                }
            }
        }
        Ok(Some(()))
    }

    fn encode_frequency_constraints(
        &self,
        problem: &mut EncodedProblem,
        plans: &[Plan],
    ) -> Result<Option<()>> {
        let mut occurrences = vec![0; self.model.n_operators()];
        let mut counts: BTreeMap<(OperatorId, usize, FactKind), usize> = BTreeMap::new();
        for plan in plans.iter() {
            if self.token.check().is_none() {
                return Ok(None);
            }
            for (k, action) in plan.actions().iter().enumerate() {
                let op = action.operator();
                if self.knowledge.is_decided(op) {
                    continue;
                }
                occurrences[op.index()] += 1;
                let before = plan.states()[k].as_ref();
                let after = plan.states()[k + 1].as_ref();
                let mut tally = |p: &GroundPredicate, kind: FactKind| -> Result<()> {
                    for c in self.knowledge.matching_candidates(self.model, action, p)? {
                        *counts.entry((op, c, kind)).or_default() += 1;
                    }
                    Ok(())
                };
                if let Some(b) = before {
                    for p in b.iter() {
                        tally(p, FactKind::Precondition)?;
                        if after.map(|a| !a.contains(p)).unwrap_or(false) {
                            tally(p, FactKind::Delete)?;
                        }
                    }
                    if let Some(a) = after {
                        for p in a.iter().filter(|p| !b.contains(p)) {
                            tally(p, FactKind::Add)?;
                        }
                    }
                }
            }
        }
        for ((op, c, kind), n) in counts {
            let ratio = n as f64 / occurrences[op.index()] as f64;
            if ratio > self.config.probability_threshold {
                let fact = self.fact(problem, op, c, kind, true);
                self.add_terms(problem, vec![vec![fact]], self.config.frequency_weight * ratio);
            }
        }
        Ok(Some(()))
    }

    fn encode_plan_constraints(
        &self,
        problem: &mut EncodedProblem,
        plans: &[Plan],
    ) -> Result<Option<()>> {
        let mut n_pairs = 0;
        let mut pair_counts: BTreeMap<(OperatorId, OperatorId), usize> = BTreeMap::new();
        let mut links: BTreeMap<(OperatorId, OperatorId), BTreeSet<(usize, usize)>> =
            BTreeMap::new();
        for plan in plans.iter() {
            if self.token.check().is_none() {
                return Ok(None);
            }
            for w in plan.actions().windows(2) {
                n_pairs += 1;
                let (ai, aj) = (&w[0], &w[1]);
                let key = (ai.operator(), aj.operator());
                if self.knowledge.is_decided(key.0) && self.knowledge.is_decided(key.1) {
                    continue;
                }
                *pair_counts.entry(key).or_default() += 1;
                let connected = ai.objects().iter().any(|o| aj.objects().contains(o));
                if !connected {
                    continue;
                }
                for (ci, ri) in self.knowledge.candidates(ai.operator()).iter().enumerate() {
                    if ri.bindings().is_empty() {
                        continue;
                    }
                    let gi = ground_reference(self.model, ai, ri)?;
                    for cj in self.knowledge.matching_candidates(self.model, aj, &gi)? {
                        links.entry(key).or_default().insert((ci, cj));
                    }
                }
            }
        }
        for (key, groundings) in links {
            let ratio = pair_counts[&key] as f64 / n_pairs as f64;
            if ratio < self.config.plan_frequency_threshold {
                continue;
            }
            let (oi, oj) = key;
            for (ci, cj) in groundings {
                let terms = vec![
                    vec![
                        self.fact(problem, oi, ci, FactKind::Precondition, true),
                        self.fact(problem, oj, cj, FactKind::Precondition, true),
                        self.fact(problem, oi, ci, FactKind::Delete, false),
                    ],
                    vec![
                        self.fact(problem, oi, ci, FactKind::Add, true),
                        self.fact(problem, oj, cj, FactKind::Precondition, true),
                    ],
                    vec![
                        self.fact(problem, oi, ci, FactKind::Delete, true),
                        self.fact(problem, oj, cj, FactKind::Add, true),
                    ],
                ];
                self.add_terms(problem, terms, self.config.plan_weight * ratio);
            }
        }
        Ok(Some(()))
    }

    fn fact(
        &self,
        problem: &EncodedProblem,
        op: OperatorId,
        candidate: usize,
        kind: FactKind,
        polarity: bool,
    ) -> FactLiteral {
        match self.knowledge.known_value(self.model, op, candidate, kind) {
            Some(v) => FactLiteral::Known(v == polarity),
            None => FactLiteral::Unknown(problem.vars[op.index()][candidate].get(kind).literal(polarity)),
        }
    }

    /// Adds a disjunction of conjunctions, substituting the known values.
    ///
    /// Nothing is added if the clause is already satisfied or cannot be satisfied.
    fn add_terms(&self, problem: &mut EncodedProblem, terms: Vec<Vec<FactLiteral>>, weight: f64) {
        let mut simplified = Vec::with_capacity(terms.len());
        for term in terms {
            if term.contains(&FactLiteral::Known(false)) {
                continue;
            }
            let literals = term
                .into_iter()
                .filter_map(|l| match l {
                    FactLiteral::Unknown(lit) => Some(lit),
                    FactLiteral::Known(_) => None,
                })
                .collect::<Vec<Literal>>();
            if literals.is_empty() {
                return;
            }
            simplified.push(literals);
        }
        if !simplified.is_empty() {
            problem.formula.add_multiclause(simplified, weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arms::tests::{switches_problem, SwitchesProblem},
        model::{Action, Object, PredicateReference, State, Tree},
    };

    fn has_clause(problem: &EncodedProblem, terms: Vec<Vec<Literal>>, weight: f64) -> bool {
        problem
            .formula
            .clauses()
            .iter()
            .any(|c| (c.weight() - weight).abs() < 1e-9 && c.terms() == terms.as_slice())
    }

    #[test]
    fn test_action_constraints() {
        let SwitchesProblem { model, worlds, .. } = switches_problem();
        let token = CancellationToken::default();
        let knowledge = Knowledge::new(&model, &token).unwrap();
        let config = LearnerConfig::default();
        let encoder = ConstraintsEncoder::new(&model, &knowledge, &config, &token);
        let weights = vec![Some(60), Some(80)];
        let problem = encoder
            .encode(worlds[0].plans(), &weights)
            .unwrap()
            .unwrap();
        assert_eq!(6, problem.formula.n_vars());
        for op in model.iter_operator_ids() {
            let w = weights[op.index()].unwrap() as f64;
            assert_eq!(1, knowledge.candidates(op).len());
            let vars = problem.vars(op, 0).unwrap();
            assert!(has_clause(
                &problem,
                vec![vec![vars.add.negative()], vec![vars.pre.negative()]],
                w
            ));
            assert!(has_clause(
                &problem,
                vec![vec![vars.del.negative()], vec![vars.pre.positive()]],
                w
            ));
        }
    }

    #[test]
    fn test_frequency_constraints() {
        let SwitchesProblem {
            model,
            worlds,
            turn_on,
            turn_off,
            ..
        } = switches_problem();
        let token = CancellationToken::default();
        let knowledge = Knowledge::new(&model, &token).unwrap();
        let config = LearnerConfig::default();
        let encoder = ConstraintsEncoder::new(&model, &knowledge, &config, &token);
        let problem = encoder
            .encode(worlds[0].plans(), &[Some(60), Some(80)])
            .unwrap()
            .unwrap();
        let on_vars = problem.vars(turn_on, 0).unwrap();
        let off_vars = problem.vars(turn_off, 0).unwrap();
        assert!(has_clause(&problem, vec![vec![on_vars.add.positive()]], 20.));
        assert!(has_clause(&problem, vec![vec![off_vars.pre.positive()]], 20.));
        assert!(has_clause(&problem, vec![vec![off_vars.del.positive()]], 20.));
        assert!(!has_clause(&problem, vec![vec![on_vars.pre.positive()]], 20.));
    }

    #[test]
    fn test_information_constraints() {
        let SwitchesProblem {
            model,
            turn_on,
            turn_off,
            on,
            ..
        } = switches_problem();
        let s1 = Object::new("s1", model.type_by_name("switch").unwrap());
        let lit = State::new(vec![GroundPredicate::new(&model, on, vec![s1.clone()]).unwrap()]);
        let plan = Plan::new(
            vec![
                Action::new(&model, turn_off, vec![s1.clone()]).unwrap(),
                Action::new(&model, turn_on, vec![s1]).unwrap(),
            ],
            vec![None, None, Some(lit)],
        )
        .unwrap();
        let token = CancellationToken::default();
        let knowledge = Knowledge::new(&model, &token).unwrap();
        let config = LearnerConfig {
            information_weight: 7.,
            ..LearnerConfig::default()
        };
        let encoder = ConstraintsEncoder::new(&model, &knowledge, &config, &token);
        let problem = encoder
            .encode(&[plan], &[Some(60), Some(80)])
            .unwrap()
            .unwrap();
        let on_vars = problem.vars(turn_on, 0).unwrap();
        let off_vars = problem.vars(turn_off, 0).unwrap();
        assert!(has_clause(&problem, vec![vec![on_vars.del.negative()]], 7.));
        assert!(!has_clause(&problem, vec![vec![off_vars.del.negative()]], 7.));
        assert!(has_clause(
            &problem,
            vec![vec![off_vars.add.positive()], vec![on_vars.add.positive()]],
            7.
        ));
    }

    #[test]
    fn test_plan_constraints_with_known_facts() {
        let SwitchesProblem {
            mut model,
            worlds,
            turn_on,
            turn_off,
            on,
        } = switches_problem();
        let on_x = PredicateReference::with_parameters(on, &[0]);
        model
            .operator_mut(turn_off)
            .set_preconditions(Some(Tree::Predicate(on_x.clone())));
        model
            .operator_mut(turn_off)
            .set_effects(Some(Tree::negated(on_x)));
        let token = CancellationToken::default();
        let knowledge = Knowledge::new(&model, &token).unwrap();
        let config = LearnerConfig::default();
        let encoder = ConstraintsEncoder::new(&model, &knowledge, &config, &token);
        let problem = encoder
            .encode(worlds[0].plans(), &[Some(60), None])
            .unwrap()
            .unwrap();
        assert_eq!(3, problem.formula.n_vars());
        assert_eq!(None, problem.vars(turn_off, 0));
        let vars = problem.vars(turn_on, 0).unwrap();
        assert!(has_clause(
            &problem,
            vec![
                vec![vars.pre.positive(), vars.del.negative()],
                vec![vars.add.positive()]
            ],
            8.
        ));
        assert!(has_clause(&problem, vec![vec![vars.add.positive()]], 8.));
    }

    #[test]
    fn test_cancelled() {
        let SwitchesProblem { model, worlds, .. } = switches_problem();
        let knowledge = Knowledge::new(&model, &CancellationToken::default()).unwrap();
        let token = CancellationToken::default();
        token.cancel();
        let config = LearnerConfig::default();
        let encoder = ConstraintsEncoder::new(&model, &knowledge, &config, &token);
        assert!(encoder
            .encode(worlds[0].plans(), &[Some(60), Some(80)])
            .unwrap()
            .is_none());
    }
}
