use crate::model::{
    Action, Binding, GroundPredicate, Model, Object, PredicateReference, State, Tree,
};
use anyhow::{anyhow, Context, Result};

/// Returns the object a binding stands for, given the action providing parameter values.
pub fn resolve_binding<'a>(
    model: &'a Model,
    action: &'a Action,
    binding: &Binding,
) -> Result<&'a Object> {
    match binding {
        Binding::Parameter(i) => action.objects().get(*i).ok_or_else(|| {
            anyhow!(
                "parameter index {} is out of bounds for operator {}",
                i,
                model.operator(action.operator()).name()
            )
        }),
        Binding::Constant(i) => model
            .constants()
            .get(*i)
            .ok_or_else(|| anyhow!("constant index {} is out of bounds", i)),
    }
}

/// Grounds a predicate reference using the objects of an action.
pub fn ground_reference(
    model: &Model,
    action: &Action,
    reference: &PredicateReference,
) -> Result<GroundPredicate> {
    let objects = reference
        .bindings()
        .iter()
        .map(|b| resolve_binding(model, action, b).map(|o| o.clone()))
        .collect::<Result<Vec<Object>>>()?;
    Ok(GroundPredicate::new_unchecked(
        model,
        reference.predicate(),
        objects,
    ))
}

/// Evaluates a tree against a state, operator parameters being resolved by an action.
pub fn evaluate(model: &Model, tree: &Tree, action: &Action, state: &State) -> Result<bool> {
    match tree {
        Tree::Predicate(r) => Ok(state.contains(&ground_reference(model, action, r)?)),
        Tree::And(children) => {
            for c in children.iter() {
                if !evaluate(model, c, action, state)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Tree::Or(children) => {
            for c in children.iter() {
                if evaluate(model, c, action, state)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Tree::Not(child) => evaluate(model, child, action, state).map(|b| !b),
        Tree::Equality(l, r) => Ok(resolve_binding(model, action, l)?
            == resolve_binding(model, action, r)?),
    }
}

/// Returns `true` iff the preconditions of the action operator hold in the state.
///
/// An operator with no preconditions is always applicable.
pub fn is_applicable(model: &Model, action: &Action, state: &State) -> Result<bool> {
    match model.operator(action.operator()).preconditions() {
        Some(t) => evaluate(model, t, action, state),
        None => Ok(true),
    }
}

/// Decodes the effects of the action into its add and delete sets.
///
/// The effects tree must be a predicate, a negated predicate, or a flat conjunction of such leaves.
pub fn decode_effects(
    model: &Model,
    action: &Action,
) -> Result<(Vec<GroundPredicate>, Vec<GroundPredicate>)> {
    let op = model.operator(action.operator());
    let mut add = vec![];
    let mut del = vec![];
    let mut decode_leaf = |t: &Tree| -> Result<()> {
        match t {
            Tree::Predicate(r) => add.push(ground_reference(model, action, r)?),
            Tree::Not(c) => match c.as_ref() {
                Tree::Predicate(r) => del.push(ground_reference(model, action, r)?),
                _ => return Err(unsupported_shape(op.name())),
            },
            _ => return Err(unsupported_shape(op.name())),
        }
        Ok(())
    };
    match op.effects() {
        None => {}
        Some(Tree::And(children)) => children.iter().try_for_each(&mut decode_leaf)?,
        Some(t) => decode_leaf(t)?,
    }
    Ok((add, del))
}

fn unsupported_shape(operator_name: &str) -> anyhow::Error {
    anyhow!(
        "the effects of operator {} are not a flat conjunction of literals",
        operator_name
    )
}

/// Applies an action to a state, returning the resulting state.
///
/// The result contains the predicates of the input state not deleted by the action, plus the ones it adds.
/// The input state is left untouched; an operator without effects gives a copy of the input state.
pub fn apply_action(model: &Model, action: &Action, state: &State) -> Result<State> {
    let (add, del) = decode_effects(model, action).with_context(|| {
        format!(
            "while applying action {}",
            action.display(model).to_string()
        )
    })?;
    if add.is_empty() && del.is_empty() {
        return Ok(state.clone());
    }
    let kept = state.iter().filter(|p| !del.contains(p)).cloned();
    Ok(State::new(kept.chain(add)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Operator, OperatorId, Parameter, Predicate, PredicateId};

    struct Fixture {
        model: Model,
        on: PredicateId,
        link: PredicateId,
        op: OperatorId,
        a: Object,
        b: Object,
    }

    fn fixture() -> Fixture {
        let mut model = Model::new("m");
        let t = model.add_type("t", &[]).unwrap();
        let x = Parameter::new("x", vec![t]).unwrap();
        let on = model
            .add_predicate(Predicate::new("on", vec![x.clone()]))
            .unwrap();
        let link = model
            .add_predicate(Predicate::new("link", vec![x.clone(), x.clone()]))
            .unwrap();
        let op = model
            .add_operator(Operator::new("op", vec![x.clone(), x]))
            .unwrap();
        let c = Object::new("c", t);
        model.add_constant(c).unwrap();
        Fixture {
            model,
            on,
            link,
            op,
            a: Object::new("a", t),
            b: Object::new("b", t),
        }
    }

    fn on_ref(f: &Fixture, p: usize) -> PredicateReference {
        PredicateReference::with_parameters(f.on, &[p])
    }

    fn gp(f: &Fixture, p: PredicateId, objects: &[&Object]) -> GroundPredicate {
        GroundPredicate::new(&f.model, p, objects.iter().map(|o| (*o).clone()).collect()).unwrap()
    }

    #[test]
    fn test_apply_add_and_delete() {
        let mut f = fixture();
        let effects = Tree::conjunction(vec![
            Tree::negated(on_ref(&f, 0)),
            Tree::Predicate(on_ref(&f, 1)),
        ]);
        f.model.operator_mut(f.op).set_effects(effects);
        let action = Action::new(&f.model, f.op, vec![f.a.clone(), f.b.clone()]).unwrap();
        let link_ab = gp(&f, f.link, &[&f.a, &f.b]);
        let state = State::new(vec![gp(&f, f.on, &[&f.a]), link_ab.clone()]);
        let next = apply_action(&f.model, &action, &state).unwrap();
        assert_eq!(State::new(vec![gp(&f, f.on, &[&f.b]), link_ab]), next);
        assert_eq!(2, state.len());
        assert!(state.contains(&gp(&f, f.on, &[&f.a])));
    }

    #[test]
    fn test_apply_no_effects() {
        let f = fixture();
        let action = Action::new(&f.model, f.op, vec![f.a.clone(), f.b.clone()]).unwrap();
        let state = State::new(vec![gp(&f, f.on, &[&f.a])]);
        assert_eq!(state, apply_action(&f.model, &action, &state).unwrap());
    }

    #[test]
    fn test_apply_single_leaf_and_dedup() {
        let mut f = fixture();
        let effects = Some(Tree::Predicate(on_ref(&f, 0)));
        f.model.operator_mut(f.op).set_effects(effects);
        let action = Action::new(&f.model, f.op, vec![f.a.clone(), f.b.clone()]).unwrap();
        let state = State::new(vec![gp(&f, f.on, &[&f.a])]);
        let next = apply_action(&f.model, &action, &state).unwrap();
        assert_eq!(1, next.len());
    }

    #[test]
    fn test_apply_with_constant() {
        let mut f = fixture();
        let effects = Some(Tree::Predicate(PredicateReference::new(
            f.on,
            vec![Binding::Constant(0)],
        )));
        f.model.operator_mut(f.op).set_effects(effects);
        let action = Action::new(&f.model, f.op, vec![f.a.clone(), f.b.clone()]).unwrap();
        let next = apply_action(&f.model, &action, &State::default()).unwrap();
        assert_eq!("{(on c)}", next.to_string());
    }

    #[test]
    fn test_apply_unsupported_shape() {
        let mut f = fixture();
        let effects = Some(Tree::Or(vec![Tree::Predicate(on_ref(&f, 0))]));
        f.model.operator_mut(f.op).set_effects(effects);
        let action = Action::new(&f.model, f.op, vec![f.a.clone(), f.b.clone()]).unwrap();
        assert!(apply_action(&f.model, &action, &State::default()).is_err());
        let effects = Some(Tree::And(vec![Tree::And(vec![Tree::Predicate(
            on_ref(&f, 0),
        )])]));
        f.model.operator_mut(f.op).set_effects(effects);
        assert!(apply_action(&f.model, &action, &State::default()).is_err());
    }

    #[test]
    fn test_evaluate() {
        let f = fixture();
        let action = Action::new(&f.model, f.op, vec![f.a.clone(), f.b.clone()]).unwrap();
        let state = State::new(vec![gp(&f, f.on, &[&f.a])]);
        let on_a = Tree::Predicate(on_ref(&f, 0));
        let on_b = Tree::Predicate(on_ref(&f, 1));
        let eval = |t: &Tree| evaluate(&f.model, t, &action, &state).unwrap();
        assert!(eval(&on_a));
        assert!(!eval(&on_b));
        assert!(!eval(&Tree::And(vec![on_a.clone(), on_b.clone()])));
        assert!(eval(&Tree::Or(vec![on_a.clone(), on_b.clone()])));
        assert!(eval(&Tree::Not(Box::new(on_b))));
        assert!(eval(&Tree::Equality(
            Binding::Parameter(0),
            Binding::Parameter(0)
        )));
        assert!(!eval(&Tree::Equality(
            Binding::Parameter(0),
            Binding::Parameter(1)
        )));
        assert!(!eval(&Tree::Equality(
            Binding::Parameter(0),
            Binding::Constant(0)
        )));
    }

    #[test]
    fn test_is_applicable() {
        let mut f = fixture();
        let action = Action::new(&f.model, f.op, vec![f.a.clone(), f.b.clone()]).unwrap();
        let state = State::new(vec![gp(&f, f.on, &[&f.a])]);
        assert!(is_applicable(&f.model, &action, &state).unwrap());
        let preconditions = Some(Tree::Predicate(on_ref(&f, 1)));
        f.model.operator_mut(f.op).set_preconditions(preconditions);
        assert!(!is_applicable(&f.model, &action, &state).unwrap());
    }
}
