use super::{Model, Parameter, PredicateReference, Tree, TypeId};
use std::fmt::Display;

/// The identifier of an operator inside a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperatorId(pub(crate) usize);

impl OperatorId {
    /// Returns the index of this operator in its model.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An action schema: typed parameters, preconditions and effects.
///
/// Both trees may be absent, which is the case of operators whose logic has to be learned.
/// The flat lists (positive and negative preconditions, add and delete lists) are derived from the trees
/// and recomputed each time a tree is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    name: String,
    parameters: Vec<Parameter>,
    preconditions: Option<Tree>,
    effects: Option<Tree>,
    positive_preconditions: Vec<PredicateReference>,
    negative_preconditions: Vec<PredicateReference>,
    add_list: Vec<PredicateReference>,
    delete_list: Vec<PredicateReference>,
}

impl Operator {
    /// Builds an operator with no preconditions and no effects.
    pub fn new(name: &str, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            preconditions: None,
            effects: None,
            positive_preconditions: vec![],
            negative_preconditions: vec![],
            add_list: vec![],
            delete_list: vec![],
        }
    }

    /// Returns the name of the operator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameters of the operator.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the number of parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Returns the preconditions, if any.
    pub fn preconditions(&self) -> Option<&Tree> {
        self.preconditions.as_ref()
    }

    /// Returns the effects, if any.
    pub fn effects(&self) -> Option<&Tree> {
        self.effects.as_ref()
    }

    /// Sets the preconditions and updates the derived precondition lists.
    pub fn set_preconditions(&mut self, preconditions: Option<Tree>) {
        self.preconditions = preconditions;
        self.refresh_lists();
    }

    /// Sets the effects and updates the add and delete lists.
    pub fn set_effects(&mut self, effects: Option<Tree>) {
        self.effects = effects;
        self.refresh_lists();
    }

    /// Returns `true` iff neither preconditions nor effects are defined.
    pub fn is_undefined(&self) -> bool {
        self.preconditions.is_none() && self.effects.is_none()
    }

    /// Returns the predicates required to hold before applying the operator.
    pub fn positive_preconditions(&self) -> &[PredicateReference] {
        &self.positive_preconditions
    }

    /// Returns the predicates required not to hold before applying the operator.
    pub fn negative_preconditions(&self) -> &[PredicateReference] {
        &self.negative_preconditions
    }

    /// Returns the predicates added by the operator.
    pub fn add_list(&self) -> &[PredicateReference] {
        &self.add_list
    }

    /// Returns the predicates deleted by the operator.
    pub fn delete_list(&self) -> &[PredicateReference] {
        &self.delete_list
    }

    /// Returns `true` iff an object of type `t` may be bound to the parameter at index `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a parameter index.
    pub fn parameter_can_have_type(&self, model: &Model, t: TypeId, idx: usize) -> bool {
        self.parameters[idx].can_have_type(model, t)
    }

    fn refresh_lists(&mut self) {
        let (pos, neg) = self
            .preconditions
            .as_ref()
            .map(|t| t.literals())
            .unwrap_or_default();
        self.positive_preconditions = pos;
        self.negative_preconditions = neg;
        let (add, del) = self
            .effects
            .as_ref()
            .map(|t| t.literals())
            .unwrap_or_default();
        self.add_list = add;
        self.delete_list = del;
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{}", p.name())?;
        }
        write!(f, ")")
    }
}
