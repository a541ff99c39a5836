use super::PredicateId;

/// The value bound to a predicate slot or an equality operand.
///
/// A binding refers either to a parameter of the enclosing operator (by index) or to a model constant (by index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Binding {
    /// The index of a parameter of the enclosing operator.
    Parameter(usize),
    /// The index of a constant of the model.
    Constant(usize),
}

/// A predicate whose slots are bound to operator parameters or constants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PredicateReference {
    predicate: PredicateId,
    bindings: Vec<Binding>,
}

impl PredicateReference {
    /// Builds a new predicate reference.
    ///
    /// The number of bindings is expected to be equal to the arity of the predicate.
    pub fn new(predicate: PredicateId, bindings: Vec<Binding>) -> Self {
        Self {
            predicate,
            bindings,
        }
    }

    /// Builds a predicate reference binding each slot to an operator parameter.
    pub fn with_parameters(predicate: PredicateId, parameters: &[usize]) -> Self {
        Self::new(
            predicate,
            parameters.iter().map(|p| Binding::Parameter(*p)).collect(),
        )
    }

    /// Returns the referenced predicate.
    pub fn predicate(&self) -> PredicateId {
        self.predicate
    }

    /// Returns the slot bindings, in predicate parameter order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

/// A logical formula over predicate references.
///
/// Children are kept in insertion order, so the traversal order is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    /// A single predicate.
    Predicate(PredicateReference),
    /// A conjunction.
    And(Vec<Tree>),
    /// A disjunction.
    Or(Vec<Tree>),
    /// A negation.
    Not(Box<Tree>),
    /// An identity test between two bound values.
    Equality(Binding, Binding),
}

impl Tree {
    /// Builds the negation of a predicate reference.
    pub fn negated(reference: PredicateReference) -> Self {
        Tree::Not(Box::new(Tree::Predicate(reference)))
    }

    /// Builds a conjunction, collapsed when it has less than two children.
    ///
    /// No child gives `None`, a single child is returned as is.
    ///
    /// # Example
    ///
    /// ```
    /// # use amlearn::model::Tree;
    /// assert_eq!(None, Tree::conjunction(vec![]));
    /// ```
    pub fn conjunction(mut children: Vec<Tree>) -> Option<Self> {
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(Tree::And(children)),
        }
    }

    /// Returns the children of this node, in traversal order.
    pub fn children(&self) -> Vec<&Tree> {
        match self {
            Tree::And(v) | Tree::Or(v) => v.iter().collect(),
            Tree::Not(c) => vec![c.as_ref()],
            Tree::Predicate(_) | Tree::Equality(_, _) => vec![],
        }
    }

    /// Splits a conjunctive tree into its positive and negative predicate literals.
    ///
    /// Conjunctions are flattened; disjunctions and equalities are not literals and are ignored.
    pub(crate) fn literals(&self) -> (Vec<PredicateReference>, Vec<PredicateReference>) {
        fn collect(
            t: &Tree,
            pos: &mut Vec<PredicateReference>,
            neg: &mut Vec<PredicateReference>,
        ) {
            match t {
                Tree::Predicate(r) => pos.push(r.clone()),
                Tree::Not(c) => {
                    if let Tree::Predicate(r) = c.as_ref() {
                        neg.push(r.clone())
                    }
                }
                Tree::And(v) => v.iter().for_each(|c| collect(c, pos, neg)),
                Tree::Or(_) | Tree::Equality(_, _) => {}
            }
        }
        let mut pos = vec![];
        let mut neg = vec![];
        collect(self, &mut pos, &mut neg);
        (pos, neg)
    }
}
