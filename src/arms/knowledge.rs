use super::candidate_groundings;
use crate::{
    model::{Action, GroundPredicate, Model, OperatorId, PredicateReference},
    transition::ground_reference,
    utils::CancellationToken,
};
use anyhow::Result;

/// The role a predicate may play in an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum FactKind {
    Precondition,
    Add,
    Delete,
}

/// The candidate groundings of the operators and the operators already decided.
///
/// The truth values of the facts of a decided operator are read from its lists.
pub(crate) struct Knowledge {
    candidates: Vec<Vec<PredicateReference>>,
    decided: Vec<bool>,
}

impl Knowledge {
    /// Computes the candidates of all operators; the operators with preconditions or effects are considered decided.
    pub(crate) fn new(model: &Model, token: &CancellationToken) -> Option<Self> {
        let mut candidates = Vec::with_capacity(model.n_operators());
        for op in model.iter_operator_ids() {
            candidates.push(candidate_groundings(model, op, token)?);
        }
        let decided = model
            .iter_operator_ids()
            .map(|op| !model.operator(op).is_undefined())
            .collect();
        Some(Self {
            candidates,
            decided,
        })
    }

    pub(crate) fn candidates(&self, op: OperatorId) -> &[PredicateReference] {
        &self.candidates[op.index()]
    }

    pub(crate) fn is_decided(&self, op: OperatorId) -> bool {
        self.decided[op.index()]
    }

    pub(crate) fn set_decided(&mut self, op: OperatorId) {
        self.decided[op.index()] = true;
    }

    pub(crate) fn undecided(&self) -> Vec<OperatorId> {
        self.decided
            .iter()
            .enumerate()
            .filter(|(_, d)| !**d)
            .map(|(i, _)| OperatorId(i))
            .collect()
    }

    /// Returns the truth value of a fact if its operator is decided.
    pub(crate) fn known_value(
        &self,
        model: &Model,
        op: OperatorId,
        candidate: usize,
        kind: FactKind,
    ) -> Option<bool> {
        if !self.is_decided(op) {
            return None;
        }
        let operator = model.operator(op);
        let list = match kind {
            FactKind::Precondition => operator.positive_preconditions(),
            FactKind::Add => operator.add_list(),
            FactKind::Delete => operator.delete_list(),
        };
        Some(list.contains(&self.candidates[op.index()][candidate]))
    }

    /// Returns the indices of the candidates of the action operator grounded by the action into the predicate.
    pub(crate) fn matching_candidates(
        &self,
        model: &Model,
        action: &Action,
        predicate: &GroundPredicate,
    ) -> Result<Vec<usize>> {
        let mut result = vec![];
        for (i, c) in self.candidates(action.operator()).iter().enumerate() {
            if c.predicate() == predicate.predicate()
                && ground_reference(model, action, c)? == *predicate
            {
                result.push(i);
            }
        }
        Ok(result)
    }
}
