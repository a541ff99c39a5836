use super::{find_holes, TransitionMatrix};
use crate::utils::CancellationToken;
use log::{debug, trace, warn};

/// Computes the transition sets of a type, each one describing a state machine.
///
/// The first set is always the one of all the transitions.
/// Then, for each hole of the matrix, the smallest hole-free and valid supersets of the hole are added,
/// excepting the ones included in another set computed from a hole.
/// Sets are lists of transition indices in increasing order.
///
/// `None` is returned if the cancellation was requested during the search.
pub fn find_transition_sets(
    matrix: &TransitionMatrix,
    token: &CancellationToken,
) -> Option<Vec<Vec<usize>>> {
    let n = matrix.transitions().len();
    let holes = find_holes(matrix.pairs());
    debug!("found {} hole(s) in the transition matrix", holes.len());
    let mut hole_sets: Vec<Vec<usize>> = vec![];
    for (r, c) in holes.iter() {
        token.check()?;
        let sets = smallest_sets_around(matrix, *r, *c, token)?;
        if sets.is_empty() {
            warn!("no valid transition set was found for hole ({}, {})", r, c);
        }
        for s in sets {
            if !hole_sets.contains(&s) {
                trace!("transition set {:?} found for hole ({}, {})", s, r, c);
                hole_sets.push(s);
            }
        }
    }
    let kept = hole_sets
        .iter()
        .filter(|s| {
            !hole_sets
                .iter()
                .any(|other| other.len() > s.len() && s.iter().all(|t| other.contains(t)))
        })
        .cloned()
        .collect::<Vec<Vec<usize>>>();
    let full = (0..n).collect::<Vec<usize>>();
    let mut result = vec![full];
    result.extend(kept.into_iter().filter(|s| s.len() < n));
    Some(result)
}

fn smallest_sets_around(
    matrix: &TransitionMatrix,
    r: usize,
    c: usize,
    token: &CancellationToken,
) -> Option<Vec<Vec<usize>>> {
    let n = matrix.transitions().len();
    let base = if r == c { vec![r] } else { vec![r.min(c), r.max(c)] };
    let others = (0..n).filter(|t| !base.contains(t)).collect::<Vec<usize>>();
    for n_extra in 0..=others.len() {
        let mut found = vec![];
        let mut chosen = Vec::with_capacity(n_extra);
        search_subsets(
            matrix,
            &base,
            &others,
            0,
            n_extra,
            &mut chosen,
            &mut found,
            token,
        )?;
        if !found.is_empty() {
            return Some(found);
        }
    }
    Some(vec![])
}

#[allow(clippy::too_many_arguments)]
fn search_subsets(
    matrix: &TransitionMatrix,
    base: &[usize],
    others: &[usize],
    from: usize,
    n_extra: usize,
    chosen: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
    token: &CancellationToken,
) -> Option<()> {
    token.check()?;
    if chosen.len() == n_extra {
        let mut set = base.iter().chain(chosen.iter()).copied().collect::<Vec<usize>>();
        set.sort_unstable();
        if is_hole_free(matrix, &set) && is_valid_set(matrix, &set) {
            found.push(set);
        }
        return Some(());
    }
    for i in from..others.len() {
        if others.len() - i < n_extra - chosen.len() {
            break;
        }
        chosen.push(others[i]);
        search_subsets(matrix, base, others, i + 1, n_extra, chosen, found, token)?;
        chosen.pop();
    }
    Some(())
}

/// Returns the succession matrix restricted to a set of transitions.
pub(crate) fn restricted_pairs(matrix: &TransitionMatrix, set: &[usize]) -> Vec<Vec<bool>> {
    set.iter()
        .map(|i| set.iter().map(|j| matrix.pairs()[*i][*j]).collect())
        .collect()
}

/// Returns `true` iff the matrix restricted to the set has no hole.
pub(crate) fn is_hole_free(matrix: &TransitionMatrix, set: &[usize]) -> bool {
    find_holes(&restricted_pairs(matrix, set)).is_empty()
}

/// Returns `true` iff following the object sequences restricted to the set only gives observed successions.
pub(crate) fn is_valid_set(matrix: &TransitionMatrix, set: &[usize]) -> bool {
    matrix.sequences().iter().all(|s| {
        let restricted = s
            .occurrences
            .iter()
            .filter(|o| set.contains(&o.transition))
            .collect::<Vec<_>>();
        restricted
            .windows(2)
            .all(|w| matrix.pairs()[w[0].transition][w[1].transition])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        locm2::{ObjectSequence, Occurrence, Transition},
        model::{Object, OperatorId, TypeId},
    };

    fn matrix_from(n: usize, sequences: &[&[usize]]) -> TransitionMatrix {
        let transitions = (0..n)
            .map(|i| Transition {
                operator: OperatorId(i),
                slot: 0,
            })
            .collect();
        let sequences = sequences
            .iter()
            .enumerate()
            .map(|(i, s)| ObjectSequence {
                object: Object::new(&format!("o{}", i), TypeId(0)),
                occurrences: s
                    .iter()
                    .enumerate()
                    .map(|(step, t)| Occurrence {
                        plan: i,
                        step,
                        transition: *t,
                    })
                    .collect(),
            })
            .collect();
        TransitionMatrix::from_sequences(TypeId(0), transitions, sequences)
    }

    #[test]
    fn test_no_hole() {
        let matrix = matrix_from(2, &[&[0, 1, 0, 1]]);
        let sets = find_transition_sets(&matrix, &CancellationToken::default()).unwrap();
        assert_eq!(vec![vec![0, 1]], sets);
    }

    #[test]
    fn test_planted_hole() {
        let matrix = matrix_from(4, &[&[2, 1], &[0, 3], &[2, 3]]);
        let sets = find_transition_sets(&matrix, &CancellationToken::default()).unwrap();
        assert_eq!(vec![vec![0, 1, 2, 3], vec![0, 1]], sets);
    }

    #[test]
    fn test_hole_needing_extra_transition() {
        let matrix = matrix_from(4, &[&[0, 2, 1], &[3, 1], &[3, 2]]);
        assert_eq!(
            vec![(0, 1), (2, 2)],
            find_holes(matrix.pairs()).into_iter().collect::<Vec<_>>()
        );
        let token = CancellationToken::default();
        assert_eq!(
            vec![vec![0, 1, 2]],
            smallest_sets_around(&matrix, 0, 1, &token).unwrap()
        );
        assert_eq!(
            vec![vec![2]],
            smallest_sets_around(&matrix, 2, 2, &token).unwrap()
        );
        let sets = find_transition_sets(&matrix, &token).unwrap();
        assert_eq!(vec![vec![0, 1, 2, 3], vec![0, 1, 2]], sets);
    }

    #[test]
    fn test_validity() {
        let matrix = matrix_from(3, &[&[0, 2, 1]]);
        assert!(!matrix.pairs()[0][1]);
        assert!(!is_valid_set(&matrix, &[0, 1]));
        assert!(is_valid_set(&matrix, &[0, 2]));
        assert!(is_valid_set(&matrix, &[0, 1, 2]));
    }

    #[test]
    fn test_cancelled() {
        let matrix = matrix_from(4, &[&[2, 1], &[0, 3], &[2, 3]]);
        let token = CancellationToken::default();
        token.cancel();
        assert!(find_transition_sets(&matrix, &token).is_none());
    }
}
