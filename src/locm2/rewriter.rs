use super::{Role, StateMachine};
use crate::model::{
    Binding, Model, Parameter, Predicate, PredicateId, PredicateReference, Tree, TypeId,
};
use anyhow::{anyhow, Context, Result};
use log::debug;

/// Translates state machines into predicates, preconditions and effects.
///
/// Each state of a machine becomes a predicate whose first parameter is the tracked object,
/// followed by the parameters carried by the state.
/// The conditions are collected for all the machines before being written to the operators by [`commit`](Self::commit).
pub struct Rewriter {
    preconditions: Vec<Vec<Tree>>,
    effects: Vec<Vec<Tree>>,
}

impl Rewriter {
    /// Builds a rewriter for the operators of a model.
    pub fn new(model: &Model) -> Self {
        Self {
            preconditions: vec![vec![]; model.n_operators()],
            effects: vec![vec![]; model.n_operators()],
        }
    }

    /// Adds the predicates of a state machine to the model and collects the conditions of its transitions.
    ///
    /// The index of the machine among the ones of its type is used to name the new predicates.
    pub fn add_state_machine(
        &mut self,
        model: &mut Model,
        object_type: TypeId,
        index: usize,
        machine: &StateMachine,
    ) -> Result<()> {
        let type_name = model.get_type(object_type).name().to_string();
        let mut predicates = Vec::with_capacity(machine.n_states());
        for state in 0..machine.n_states() {
            let mut parameters = vec![Parameter::new(&type_name, vec![object_type])?];
            for (k, p) in machine.parameters(state).iter().enumerate() {
                parameters.push(Parameter::new(&format!("p{}", k + 1), p.types().to_vec())?);
            }
            let name = format!("{}_fsm{}_s{}", type_name, index, state);
            let predicate = Predicate::new(&name, parameters);
            debug!("new predicate {}", predicate);
            predicates.push(
                model
                    .add_predicate(predicate)
                    .with_context(|| format!("while adding the states of type {}", type_name))?,
            );
        }
        for (k, transition) in machine.transitions().iter().enumerate() {
            let (before, after) = (machine.before(k), machine.after(k));
            let pre = state_reference(machine, predicates[before], before, k, Role::Out)?;
            let post = state_reference(machine, predicates[after], after, k, Role::In)?;
            let op = transition.operator.index();
            push_unique(&mut self.preconditions[op], Tree::Predicate(pre.clone()));
            if pre != post {
                push_unique(&mut self.effects[op], Tree::negated(pre));
                push_unique(&mut self.effects[op], Tree::Predicate(post));
            }
        }
        Ok(())
    }

    /// Writes the collected conditions to the operators.
    pub fn commit(self, model: &mut Model) {
        let operators = model.iter_operator_ids().collect::<Vec<_>>();
        for ((op, preconditions), effects) in operators
            .into_iter()
            .zip(self.preconditions.into_iter())
            .zip(self.effects.into_iter())
        {
            let operator = model.operator_mut(op);
            operator.set_preconditions(Tree::conjunction(preconditions));
            operator.set_effects(Tree::conjunction(effects));
        }
    }
}

// The tracked object is always bound to the transition slot,
// so two references of the same predicate differ iff a state parameter rebinds.
fn state_reference(
    machine: &StateMachine,
    predicate: PredicateId,
    state: usize,
    transition: usize,
    role: Role,
) -> Result<PredicateReference> {
    let mut bindings = vec![Binding::Parameter(machine.transitions()[transition].slot)];
    for p in machine.parameters(state) {
        let slot = p.slot(transition, role).ok_or_else(|| {
            anyhow!(
                "state {} carries a parameter unbound for transition {}",
                state,
                transition
            )
        })?;
        bindings.push(Binding::Parameter(slot));
    }
    Ok(PredicateReference::new(predicate, bindings))
}

fn push_unique(trees: &mut Vec<Tree>, tree: Tree) {
    if !trees.contains(&tree) {
        trees.push(tree);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        locm2::{
            tests::{logistics_problem, LogisticsProblem},
            TransitionMatrix,
        },
        model::Plan,
        utils::CancellationToken,
    };

    #[test]
    fn test_package_predicates() {
        let LogisticsProblem {
            mut model,
            worlds,
            package,
            load,
            unload,
            ..
        } = logistics_problem();
        let plans = worlds[0].plans().to_vec();
        let matrix = TransitionMatrix::new(&model, package, &plans);
        let machine =
            StateMachine::new(&model, &matrix, &[0, 1], &plans, &CancellationToken::default())
                .unwrap();
        let mut rewriter = Rewriter::new(&model);
        rewriter
            .add_state_machine(&mut model, package, 0, &machine)
            .unwrap();
        rewriter.commit(&mut model);
        let s0 = model.predicate_by_name("package_fsm0_s0").unwrap();
        let s1 = model.predicate_by_name("package_fsm0_s1").unwrap();
        assert_eq!("(package_fsm0_s0 ?package ?p1)", model.predicate(s0).to_string());
        let at = PredicateReference::with_parameters(s0, &[0, 2]);
        let inside = PredicateReference::with_parameters(s1, &[0, 1]);
        assert_eq!(
            Some(&Tree::Predicate(at.clone())),
            model.operator(load).preconditions()
        );
        assert_eq!(
            Some(&Tree::And(vec![
                Tree::negated(at.clone()),
                Tree::Predicate(inside.clone())
            ])),
            model.operator(load).effects()
        );
        assert_eq!(&[inside.clone()], model.operator(unload).delete_list());
        assert_eq!(&[at], model.operator(unload).add_list());
    }

    #[test]
    fn test_name_clash() {
        let LogisticsProblem {
            mut model,
            worlds,
            package,
            ..
        } = logistics_problem();
        let plans: Vec<Plan> = worlds[0].plans().to_vec();
        let matrix = TransitionMatrix::new(&model, package, &plans);
        let machine =
            StateMachine::new(&model, &matrix, &[0, 1], &plans, &CancellationToken::default())
                .unwrap();
        let mut rewriter = Rewriter::new(&model);
        rewriter
            .add_state_machine(&mut model, package, 0, &machine)
            .unwrap();
        assert!(rewriter
            .add_state_machine(&mut model, package, 0, &machine)
            .is_err());
    }
}
