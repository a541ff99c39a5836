use super::{Model, Object, OperatorId, State};
use anyhow::{anyhow, Result};
use std::fmt::Display;

/// An instance of an operator, with one object per operator parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    operator: OperatorId,
    objects: Vec<Object>,
}

impl Action {
    /// Builds a new action.
    ///
    /// An error is returned if the number of objects differs from the operator arity,
    /// or if an object type is not allowed for its parameter.
    pub fn new(model: &Model, operator: OperatorId, objects: Vec<Object>) -> Result<Self> {
        let op = model.operator(operator);
        if op.arity() != objects.len() {
            return Err(anyhow!(
                "operator {} expects {} object(s), got {}",
                op.name(),
                op.arity(),
                objects.len()
            ));
        }
        if let Some((i, o)) = objects
            .iter()
            .enumerate()
            .find(|(i, o)| !op.parameter_can_have_type(model, o.object_type(), *i))
        {
            return Err(anyhow!(
                "object {} cannot be bound to parameter ?{} of operator {}",
                o,
                op.parameters()[i].name(),
                op.name()
            ));
        }
        Ok(Self { operator, objects })
    }

    /// Returns the operator of this action.
    pub fn operator(&self) -> OperatorId {
        self.operator
    }

    /// Returns the objects bound to the operator parameters.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Returns a displayable version of this action.
    pub fn display<'a>(&'a self, model: &'a Model) -> impl Display + 'a {
        ActionDisplay {
            action: self,
            model,
        }
    }
}

struct ActionDisplay<'a> {
    action: &'a Action,
    model: &'a Model,
}

impl Display for ActionDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.model.operator(self.action.operator).name())?;
        for o in self.action.objects.iter() {
            write!(f, " {}", o)?;
        }
        write!(f, ")")
    }
}

/// An observed sequence of actions, interleaved with (possibly unknown) states.
///
/// The state at index `i` is the one observed before the action at index `i`;
/// there is one more state than actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    actions: Vec<Action>,
    states: Vec<Option<State>>,
}

impl Plan {
    /// Builds a new plan.
    ///
    /// An error is returned if the number of states is not the number of actions plus one.
    pub fn new(actions: Vec<Action>, states: Vec<Option<State>>) -> Result<Self> {
        if states.len() != actions.len() + 1 {
            return Err(anyhow!(
                "a plan with {} action(s) must have {} state(s), got {}",
                actions.len(),
                actions.len() + 1,
                states.len()
            ));
        }
        Ok(Self { actions, states })
    }

    /// Builds a plan for which no state is known.
    pub fn with_unknown_states(actions: Vec<Action>) -> Self {
        let states = vec![None; actions.len() + 1];
        Self { actions, states }
    }

    /// Returns the actions of the plan.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the states of the plan.
    pub fn states(&self) -> &[Option<State>] {
        &self.states
    }

    /// Returns the number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` iff the plan has no action.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Removes the first action, replacing the initial state by the provided one.
    pub(crate) fn pop_front(&mut self, new_initial_state: Option<State>) {
        self.actions.remove(0);
        self.states.remove(0);
        self.states[0] = new_initial_state;
    }
}

/// A set of objects and the plans observed on them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    objects: Vec<Object>,
    plans: Vec<Plan>,
}

impl World {
    /// Builds a new world.
    pub fn new(objects: Vec<Object>, plans: Vec<Plan>) -> Self {
        Self { objects, plans }
    }

    /// Returns the objects of the world.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Returns the plans of the world.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Returns an object given its name.
    pub fn object_by_name(&self, name: &str) -> Result<&Object> {
        self.objects
            .iter()
            .find(|o| o.name() == name)
            .ok_or_else(|| anyhow!("no such object: {}", name))
    }
}
