use super::{find_transition_sets, Rewriter, StateMachine, TransitionMatrix};
use crate::{
    learners::{Learner, LearningStatus},
    model::{Model, Plan, World},
    utils::CancellationToken,
};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};

/// The LOCM2 action model learner.
///
/// For each object type, the learner looks at the sequences of transitions the objects of this type go through.
/// These sequences are split into state machines, whose states become new predicates of the model.
/// The preconditions and the effects of every operator are rebuilt from these state machines,
/// discarding the ones the model may already contain.
///
/// The learning process works on a copy of the model, which replaces the original one only on completion.
#[derive(Default)]
pub struct Locm2Learner {
    n_state_machines: usize,
}

impl Locm2Learner {
    /// Builds a new LOCM2 learner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of state machines computed by the last learning run.
    pub fn n_state_machines(&self) -> usize {
        self.n_state_machines
    }
}

impl Learner for Locm2Learner {
    fn learn(
        &mut self,
        model: &mut Model,
        worlds: &[World],
        token: &CancellationToken,
    ) -> Result<LearningStatus> {
        self.n_state_machines = 0;
        let plans = worlds
            .iter()
            .flat_map(|w| w.plans().iter().cloned())
            .collect::<Vec<Plan>>();
        if plans.is_empty() {
            return Err(anyhow!("cannot learn an action model without any plan"));
        }
        let mut learned = model.clone();
        for op in model.iter_operator_ids() {
            let operator = learned.operator_mut(op);
            operator.set_preconditions(None);
            operator.set_effects(None);
        }
        let mut rewriter = Rewriter::new(&learned);
        for object_type in model.iter_type_ids() {
            if token.is_cancelled() {
                return Ok(LearningStatus::Cancelled);
            }
            let type_name = model.get_type(object_type).name();
            let matrix = TransitionMatrix::new(&learned, object_type, &plans);
            if matrix.is_unobserved() {
                info!("skipping type {}: no object of this type is involved in the plans", type_name);
                continue;
            }
            if let Some(t) = (0..matrix.transitions().len()).find(|t| !matrix.occurs(*t)) {
                let transition = matrix.transitions()[t];
                return Err(anyhow!(
                    "cannot compute the states of type {}: parameter {} of operator {} is never bound to an object of this type",
                    type_name,
                    transition.slot,
                    model.operator(transition.operator).name()
                ));
            }
            let sets = match find_transition_sets(&matrix, token) {
                Some(s) => s,
                None => return Ok(LearningStatus::Cancelled),
            };
            info!(
                "type {} has {} transition(s) and {} transition set(s)",
                type_name,
                matrix.transitions().len(),
                sets.len()
            );
            for (index, set) in sets.iter().enumerate() {
                let machine = match StateMachine::new(&learned, &matrix, set, &plans, token) {
                    Some(m) => m,
                    None => return Ok(LearningStatus::Cancelled),
                };
                debug!(
                    "transition set {:?} of type {} gives {} state(s)",
                    set,
                    type_name,
                    machine.n_states()
                );
                rewriter
                    .add_state_machine(&mut learned, object_type, index, &machine)
                    .with_context(|| format!("while rewriting the states of type {}", type_name))?;
                self.n_state_machines += 1;
            }
        }
        rewriter.commit(&mut learned);
        info!(
            "LOCM2 computed {} state machine(s)",
            self.n_state_machines
        );
        *model = learned;
        Ok(LearningStatus::Completed)
    }
}
