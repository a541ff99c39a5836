use crate::model::{Model, Object, OperatorId, Plan, TypeId};
use std::collections::{BTreeMap, BTreeSet};

/// A transition of an object type: an operator and the index of a parameter accepting the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    /// The operator.
    pub operator: OperatorId,
    /// The index of the parameter the object is bound to.
    pub slot: usize,
}

/// The use of a transition by an object at a given step of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// The index of the plan.
    pub plan: usize,
    /// The index of the action in the plan.
    pub step: usize,
    /// The index of the transition.
    pub transition: usize,
}

/// The transitions an object goes through in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSequence {
    /// The object.
    pub object: Object,
    /// The occurrences, in plan order.
    pub occurrences: Vec<Occurrence>,
}

/// The transitions of an object type and the observed successions of these transitions.
///
/// `pairs[i][j]` is `true` iff an object of the type goes through transition `j` just after transition `i` in some plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionMatrix {
    object_type: TypeId,
    transitions: Vec<Transition>,
    pairs: Vec<Vec<bool>>,
    sequences: Vec<ObjectSequence>,
}

impl TransitionMatrix {
    /// Computes the transition matrix of a type.
    ///
    /// Only the objects whose type is exactly `object_type` are followed.
    pub fn new(model: &Model, object_type: TypeId, plans: &[Plan]) -> Self {
        let mut transitions = vec![];
        for op in model.iter_operator_ids() {
            for slot in 0..model.operator(op).arity() {
                if model
                    .operator(op)
                    .parameter_can_have_type(model, object_type, slot)
                {
                    transitions.push(Transition { operator: op, slot });
                }
            }
        }
        let mut by_object: BTreeMap<(usize, Object), Vec<Occurrence>> = BTreeMap::new();
        for (plan_index, plan) in plans.iter().enumerate() {
            for (step, action) in plan.actions().iter().enumerate() {
                for (slot, o) in action.objects().iter().enumerate() {
                    if o.object_type() != object_type {
                        continue;
                    }
                    let t = Transition {
                        operator: action.operator(),
                        slot,
                    };
                    if let Some(transition) = transitions.iter().position(|other| *other == t) {
                        by_object
                            .entry((plan_index, o.clone()))
                            .or_default()
                            .push(Occurrence {
                                plan: plan_index,
                                step,
                                transition,
                            });
                    }
                }
            }
        }
        let sequences = by_object
            .into_iter()
            .map(|((_, object), occurrences)| ObjectSequence {
                object,
                occurrences,
            })
            .collect();
        Self::from_sequences(object_type, transitions, sequences)
    }

    /// Builds a transition matrix from already computed object sequences.
    pub(crate) fn from_sequences(
        object_type: TypeId,
        transitions: Vec<Transition>,
        sequences: Vec<ObjectSequence>,
    ) -> Self {
        let mut pairs = vec![vec![false; transitions.len()]; transitions.len()];
        for s in sequences.iter() {
            for w in s.occurrences.windows(2) {
                pairs[w[0].transition][w[1].transition] = true;
            }
        }
        Self {
            object_type,
            transitions,
            pairs,
            sequences,
        }
    }

    /// Returns the object type.
    pub fn object_type(&self) -> TypeId {
        self.object_type
    }

    /// Returns the transitions of the type.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the succession matrix.
    pub fn pairs(&self) -> &[Vec<bool>] {
        &self.pairs
    }

    /// Returns the per-plan sequences of the objects of the type.
    pub fn sequences(&self) -> &[ObjectSequence] {
        &self.sequences
    }

    /// Returns `true` iff some object goes through the transition.
    pub fn occurs(&self, transition: usize) -> bool {
        self.sequences
            .iter()
            .flat_map(|s| s.occurrences.iter())
            .any(|o| o.transition == transition)
    }

    /// Returns `true` iff no transition occurs in the plans.
    pub fn is_unobserved(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Computes the holes of a succession matrix.
///
/// `(r, c)` is a hole iff `pairs[r][c]` is false while there exist `r' != r` and `c' != c`
/// such that `pairs[r'][c]`, `pairs[r][c']` and `pairs[r'][c']` hold.
///
/// # Example
///
/// ```
/// # use amlearn::locm2::find_holes;
/// let pairs = vec![vec![false, true], vec![true, true]];
/// assert_eq!(vec![(0, 0)], find_holes(&pairs).into_iter().collect::<Vec<_>>());
/// ```
pub fn find_holes(pairs: &[Vec<bool>]) -> BTreeSet<(usize, usize)> {
    let n = pairs.len();
    let mut holes = BTreeSet::new();
    for r in 0..n {
        for c in 0..n {
            if pairs[r][c] {
                continue;
            }
            let is_hole = (0..n).filter(|r2| *r2 != r && pairs[*r2][c]).any(|r2| {
                (0..n)
                    .filter(|c2| *c2 != c)
                    .any(|c2| pairs[r][c2] && pairs[r2][c2])
            });
            if is_hole {
                holes.insert((r, c));
            }
        }
    }
    holes
}
