use super::{transition_sets::restricted_pairs, Transition, TransitionMatrix};
use crate::{
    model::{Model, Plan, TypeId},
    utils::CancellationToken,
};
use log::trace;
use std::collections::{BTreeMap, BTreeSet};

/// The role of a transition relatively to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// The transition ends in the state.
    In,
    /// The transition starts from the state.
    Out,
}

/// The states before and after each transition of a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateIds {
    /// The state each transition starts from.
    pub before: Vec<usize>,
    /// The state each transition ends in.
    pub after: Vec<usize>,
    /// The number of states.
    pub n_states: usize,
}

/// Computes the states of a state machine given the successions of its transitions.
///
/// Each transition starts with its own before and after states.
/// The after state of `i` and the before state of `j` are merged when `j` may follow `i`.
/// State ids are then made dense, in order of first appearance.
///
/// # Example
///
/// ```
/// # use amlearn::locm2::make_state_ids;
/// let ids = make_state_ids(&[vec![false, true], vec![true, false]]);
/// assert_eq!(2, ids.n_states);
/// assert_eq!(ids.after[0], ids.before[1]);
/// ```
pub fn make_state_ids(pairs: &[Vec<bool>]) -> StateIds {
    let n = pairs.len();
    let mut parents = (0..2 * n).collect::<Vec<usize>>();
    for (i, row) in pairs.iter().enumerate() {
        for (j, linked) in row.iter().enumerate() {
            if *linked {
                let a = find(&mut parents, 2 * i + 1);
                let b = find(&mut parents, 2 * j);
                parents[a] = b;
            }
        }
    }
    let mut dense = BTreeMap::new();
    let mut ids = Vec::with_capacity(2 * n);
    for node in 0..2 * n {
        let root = find(&mut parents, node);
        let next = dense.len();
        ids.push(*dense.entry(root).or_insert(next));
    }
    StateIds {
        before: ids.iter().step_by(2).copied().collect(),
        after: ids.iter().skip(1).step_by(2).copied().collect(),
        n_states: dense.len(),
    }
}

fn find(parents: &mut [usize], mut x: usize) -> usize {
    while parents[x] != x {
        parents[x] = parents[parents[x]];
        x = parents[x];
    }
    x
}

/// An object carried by a state in addition to the tracked one.
///
/// The parameter gives, for each transition incident to its state, the operator parameter it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateParameter {
    types: Vec<TypeId>,
    slots: BTreeMap<(usize, Role), usize>,
}

impl StateParameter {
    /// Returns the allowed types of the parameter.
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    /// Returns the operator parameter bound to this parameter for a transition of the set.
    pub fn slot(&self, transition: usize, role: Role) -> Option<usize> {
        self.slots.get(&(transition, role)).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hypothesis {
    first: usize,
    first_slot: usize,
    second: usize,
    second_slot: usize,
    state: usize,
}

/// The state machine of a transition set.
///
/// Transitions are indexed by their position in the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    transitions: Vec<Transition>,
    ids: StateIds,
    parameters: Vec<Vec<StateParameter>>,
}

impl StateMachine {
    /// Builds the state machine of a transition set, including the parameters of its states.
    ///
    /// The plans must be the ones the matrix was computed from.
    /// `None` is returned if the cancellation was requested.
    pub fn new(
        model: &Model,
        matrix: &TransitionMatrix,
        set: &[usize],
        plans: &[Plan],
        token: &CancellationToken,
    ) -> Option<Self> {
        let pairs = restricted_pairs(matrix, set);
        let ids = make_state_ids(&pairs);
        let transitions = set
            .iter()
            .map(|t| matrix.transitions()[*t])
            .collect::<Vec<Transition>>();
        let hypotheses = make_hypotheses(model, &transitions, &pairs, &ids);
        trace!("{} parameter hypotheses before falsification", hypotheses.len());
        let hypotheses = falsify(matrix, set, plans, hypotheses, token)?;
        trace!("{} parameter hypotheses after falsification", hypotheses.len());
        let parameters = (0..ids.n_states)
            .map(|state| induce_parameters(model, &transitions, &ids, &hypotheses, state))
            .collect();
        Some(Self {
            transitions,
            ids,
            parameters,
        })
    }

    /// Returns the transitions of the machine.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the number of states.
    pub fn n_states(&self) -> usize {
        self.ids.n_states
    }

    /// Returns the state a transition starts from.
    pub fn before(&self, transition: usize) -> usize {
        self.ids.before[transition]
    }

    /// Returns the state a transition ends in.
    pub fn after(&self, transition: usize) -> usize {
        self.ids.after[transition]
    }

    /// Returns the parameters carried by a state.
    pub fn parameters(&self, state: usize) -> &[StateParameter] {
        &self.parameters[state]
    }
}

fn make_hypotheses(
    model: &Model,
    transitions: &[Transition],
    pairs: &[Vec<bool>],
    ids: &StateIds,
) -> Vec<Hypothesis> {
    let mut hypotheses = vec![];
    for (i, first) in transitions.iter().enumerate() {
        let first_params = model.operator(first.operator).parameters();
        for (j, second) in transitions.iter().enumerate() {
            if !pairs[i][j] {
                continue;
            }
            let second_params = model.operator(second.operator).parameters();
            for first_slot in (0..first_params.len()).filter(|s| *s != first.slot) {
                for second_slot in (0..second_params.len()).filter(|s| *s != second.slot) {
                    if first_params[first_slot].shares_type_with(&second_params[second_slot]) {
                        hypotheses.push(Hypothesis {
                            first: i,
                            first_slot,
                            second: j,
                            second_slot,
                            state: ids.after[i],
                        });
                    }
                }
            }
        }
    }
    hypotheses
}

// A single contradicting occurrence drops a hypothesis.
fn falsify(
    matrix: &TransitionMatrix,
    set: &[usize],
    plans: &[Plan],
    hypotheses: Vec<Hypothesis>,
    token: &CancellationToken,
) -> Option<Vec<Hypothesis>> {
    let mut contradicted = vec![false; hypotheses.len()];
    for sequence in matrix.sequences() {
        token.check()?;
        let restricted = sequence
            .occurrences
            .iter()
            .filter_map(|o| set.iter().position(|t| *t == o.transition).map(|k| (o, k)))
            .collect::<Vec<_>>();
        for w in restricted.windows(2) {
            let (o1, i) = w[0];
            let (o2, j) = w[1];
            let first = &plans[o1.plan].actions()[o1.step];
            let second = &plans[o2.plan].actions()[o2.step];
            for (h, hypothesis) in hypotheses.iter().enumerate() {
                if hypothesis.first != i || hypothesis.second != j {
                    continue;
                }
                if first.objects()[hypothesis.first_slot]
                    != second.objects()[hypothesis.second_slot]
                {
                    contradicted[h] = true;
                }
            }
        }
    }
    Some(
        hypotheses
            .into_iter()
            .enumerate()
            .filter(|(h, _)| !contradicted[*h])
            .map(|(_, hypothesis)| hypothesis)
            .collect(),
    )
}

type Record = BTreeSet<(usize, usize, Role)>;

fn induce_parameters(
    model: &Model,
    transitions: &[Transition],
    ids: &StateIds,
    hypotheses: &[Hypothesis],
    state: usize,
) -> Vec<StateParameter> {
    let mut records = hypotheses
        .iter()
        .filter(|h| h.state == state)
        .map(|h| {
            [
                (h.first, h.first_slot, Role::In),
                (h.second, h.second_slot, Role::Out),
            ]
            .into_iter()
            .collect::<Record>()
        })
        .collect::<Vec<Record>>();
    merge_records(&mut records);
    records.sort();
    let mut incident = BTreeSet::new();
    for k in 0..transitions.len() {
        if ids.after[k] == state {
            incident.insert((k, Role::In));
        }
        if ids.before[k] == state {
            incident.insert((k, Role::Out));
        }
    }
    records
        .into_iter()
        .filter_map(|record| {
            let mut slots = BTreeMap::new();
            for (k, slot, role) in record.iter() {
                slots.entry((*k, *role)).or_insert(*slot);
            }
            if slots.len() != incident.len() {
                return None;
            }
            let (k, slot, _) = record.iter().next()?;
            let types = model.operator(transitions[*k].operator).parameters()[*slot]
                .types()
                .to_vec();
            Some(StateParameter { types, slots })
        })
        .collect()
}

fn merge_records(records: &mut Vec<Record>) {
    let mut merged = true;
    while merged {
        merged = false;
        'search: for i in 0..records.len() {
            for j in i + 1..records.len() {
                if !records[i].is_disjoint(&records[j]) {
                    let other = records.swap_remove(j);
                    records[i].extend(other);
                    merged = true;
                    break 'search;
                }
            }
        }
    }
}
