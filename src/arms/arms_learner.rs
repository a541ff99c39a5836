use super::{
    constraints_encoder::{ConstraintsEncoder, EncodedProblem},
    knowledge::Knowledge,
};
use crate::{
    learners::{Learner, LearningStatus},
    model::{Model, OperatorId, Plan, Tree, World},
    sat::{self, Assignment, SolvingLogger},
    transition::apply_action,
    utils::{CancellationToken, LearnerConfig},
};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rand::Rng;

/// The ARMS action model learner.
///
/// The learner decides the operators having neither preconditions nor effects, a batch of operators per round.
/// At each round, each undecided operator receives a random weight,
/// and the observed plans are translated into a weighted MAX-SAT formula over the candidate facts of these operators.
/// The operators with the highest weight are then decided according to the solution of the formula,
/// and the plans are trimmed of their leading actions involving decided operators.
///
/// The learning process works on a copy of the model, which replaces the original one only on completion.
///
/// # Example
///
/// ```
/// # use amlearn::arms::ArmsLearner;
/// # use amlearn::learners::{Learner, LearningStatus};
/// # use amlearn::model::{Action, Model, Object, Operator, Parameter, Plan, Predicate, State, GroundPredicate, World};
/// # use amlearn::utils::{CancellationToken, LearnerConfig};
/// let mut model = Model::new("lights");
/// let t = model.add_type("light", &[]).unwrap();
/// let x = Parameter::new("l", vec![t]).unwrap();
/// let on = model.add_predicate(Predicate::new("on", vec![x.clone()])).unwrap();
/// let switch_on = model.add_operator(Operator::new("switch-on", vec![x])).unwrap();
/// let l1 = Object::new("l1", t);
/// let action = Action::new(&model, switch_on, vec![l1.clone()]).unwrap();
/// let after = State::new(vec![GroundPredicate::new(&model, on, vec![l1.clone()]).unwrap()]);
/// let plan = Plan::new(vec![action], vec![Some(State::default()), Some(after)]).unwrap();
/// let worlds = vec![World::new(vec![l1], vec![plan])];
/// let mut learner = ArmsLearner::new(LearnerConfig { seed: Some(0), ..LearnerConfig::default() });
/// let status = learner.learn(&mut model, &worlds, &CancellationToken::default()).unwrap();
/// assert_eq!(LearningStatus::Completed, status);
/// assert_eq!(1, model.operator(switch_on).add_list().len());
/// ```
pub struct ArmsLearner {
    config: LearnerConfig,
    n_rounds: usize,
}

impl ArmsLearner {
    /// Builds a new ARMS learner.
    pub fn new(config: LearnerConfig) -> Self {
        Self {
            config,
            n_rounds: 0,
        }
    }

    /// Returns the number of rounds of the last learning run.
    pub fn n_rounds(&self) -> usize {
        self.n_rounds
    }
}

impl Learner for ArmsLearner {
    fn learn(
        &mut self,
        model: &mut Model,
        worlds: &[World],
        token: &CancellationToken,
    ) -> Result<LearningStatus> {
        self.config.check()?;
        self.n_rounds = 0;
        let mut plans = worlds
            .iter()
            .flat_map(|w| w.plans().iter().cloned())
            .collect::<Vec<Plan>>();
        if plans.is_empty() {
            return Err(anyhow!("cannot learn an action model without any plan"));
        }
        let mut learned = model.clone();
        let mut knowledge = match Knowledge::new(&learned, token) {
            Some(k) => k,
            None => return Ok(LearningStatus::Cancelled),
        };
        let mut rng = self.config.new_rng();
        let mut solver = sat::new_solver(&self.config);
        solver.add_listener(Box::new(SolvingLogger));
        loop {
            let undecided = knowledge.undecided();
            if undecided.is_empty() {
                break;
            }
            if token.is_cancelled() {
                return Ok(LearningStatus::Cancelled);
            }
            self.n_rounds += 1;
            info!(
                "starting ARMS round {} with {} undecided operator(s) and {} plan(s)",
                self.n_rounds,
                undecided.len(),
                plans.len()
            );
            let mut weights = vec![None; learned.n_operators()];
            for op in undecided.iter() {
                weights[op.index()] = Some(
                    rng.gen_range(self.config.operator_weight_min..=self.config.operator_weight_max),
                );
            }
            let max_weight = weights.iter().flatten().max().copied();
            let encoder = ConstraintsEncoder::new(&learned, &knowledge, &self.config, token);
            let problem = match encoder.encode(&plans, &weights)? {
                Some(p) => p,
                None => return Ok(LearningStatus::Cancelled),
            };
            debug!(
                "ARMS formula has {} variables and {} clauses",
                problem.formula.n_vars(),
                problem.formula.clauses().len()
            );
            let assignment = match solver.solve(&problem.formula, &mut rng, token) {
                Some(a) => a,
                None => return Ok(LearningStatus::Cancelled),
            };
            for op in undecided
                .into_iter()
                .filter(|op| weights[op.index()] == max_weight)
            {
                decide_operator(&mut learned, &knowledge, &problem, &assignment, op);
                knowledge.set_decided(op);
                info!("decided operator {}", learned.operator(op).name());
            }
            trim_plans(&learned, &knowledge, &mut plans)
                .context("while trimming the plans after an ARMS round")?;
        }
        info!("ARMS decided every operator in {} round(s)", self.n_rounds);
        *model = learned;
        Ok(LearningStatus::Completed)
    }
}

fn decide_operator(
    model: &mut Model,
    knowledge: &Knowledge,
    problem: &EncodedProblem,
    assignment: &Assignment,
    op: OperatorId,
) {
    let mut preconditions = vec![];
    let mut adds = vec![];
    let mut deletes = vec![];
    for (i, c) in knowledge.candidates(op).iter().enumerate() {
        let vars = match problem.vars(op, i) {
            Some(v) => v,
            None => continue,
        };
        if assignment.value_of(vars.pre) {
            preconditions.push(Tree::Predicate(c.clone()));
        }
        if assignment.value_of(vars.add) {
            adds.push(Tree::Predicate(c.clone()));
        }
        if assignment.value_of(vars.del) {
            deletes.push(Tree::negated(c.clone()));
        }
    }
    adds.append(&mut deletes);
    let operator = model.operator_mut(op);
    operator.set_preconditions(Tree::conjunction(preconditions));
    operator.set_effects(Tree::conjunction(adds));
}

/// Removes the leading actions of decided operators, applying them to compute the new initial states.
///
/// Plans left without actions are dropped.
fn trim_plans(model: &Model, knowledge: &Knowledge, plans: &mut Vec<Plan>) -> Result<()> {
    for plan in plans.iter_mut() {
        while !plan.is_empty() && knowledge.is_decided(plan.actions()[0].operator()) {
            let next = match &plan.states()[0] {
                Some(s) => {
                    let applied = apply_action(model, &plan.actions()[0], s)?;
                    Some(match &plan.states()[1] {
                        Some(observed) => applied.union(observed),
                        None => applied,
                    })
                }
                None => plan.states()[1].clone(),
            };
            plan.pop_front(next);
        }
    }
    plans.retain(|p| !p.is_empty());
    Ok(())
}
