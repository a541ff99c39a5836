use crate::{
    model::{Model, OperatorId, PredicateId, PredicateReference},
    utils::CancellationToken,
};

/// Enumerates the predicate references an operator may use in its preconditions and effects.
///
/// Each predicate slot is bound to a distinct operator parameter whose values may be bound to the slot.
/// References are given in predicate order, then in lexicographic order of the parameter indices.
/// `None` is returned if the cancellation was requested during the enumeration.
///
/// # Example
///
/// ```
/// # use amlearn::arms::candidate_groundings;
/// # use amlearn::model::{Model, Operator, Parameter, Predicate};
/// # use amlearn::utils::CancellationToken;
/// let mut model = Model::new("m");
/// let t = model.add_type("t", &[]).unwrap();
/// let x = Parameter::new("x", vec![t]).unwrap();
/// model.add_predicate(Predicate::new("link", vec![x.clone(), x.clone()])).unwrap();
/// let op = model.add_operator(Operator::new("op", vec![x.clone(), x])).unwrap();
/// let candidates = candidate_groundings(&model, op, &CancellationToken::default()).unwrap();
/// assert_eq!(2, candidates.len());
/// ```
pub fn candidate_groundings(
    model: &Model,
    operator: OperatorId,
    token: &CancellationToken,
) -> Option<Vec<PredicateReference>> {
    let mut result = vec![];
    for p in model.iter_predicate_ids() {
        let mut current = Vec::with_capacity(model.predicate(p).arity());
        let mut used = vec![false; model.operator(operator).arity()];
        enumerate_bindings(
            model,
            operator,
            p,
            &mut current,
            &mut used,
            &mut result,
            token,
        )?;
    }
    Some(result)
}

fn enumerate_bindings(
    model: &Model,
    operator: OperatorId,
    predicate: PredicateId,
    current: &mut Vec<usize>,
    used: &mut [bool],
    result: &mut Vec<PredicateReference>,
    token: &CancellationToken,
) -> Option<()> {
    token.check()?;
    let slots = model.predicate(predicate).parameters();
    if current.len() == slots.len() {
        result.push(PredicateReference::with_parameters(predicate, &current[..]));
        return Some(());
    }
    let slot = &slots[current.len()];
    let op_params = model.operator(operator).parameters();
    for (i, param) in op_params.iter().enumerate() {
        if used[i] || !param.is_compatible_with(model, slot) {
            continue;
        }
        used[i] = true;
        current.push(i);
        enumerate_bindings(model, operator, predicate, current, used, result, token)?;
        current.pop();
        used[i] = false;
    }
    Some(())
}
