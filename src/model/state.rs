use super::{Model, Object, PredicateId};
use anyhow::{anyhow, Result};
use std::{cmp::Ordering, fmt::Display};

/// A predicate whose slots are bound to concrete objects.
///
/// Ground predicates are ordered by predicate name, then arity, then objects (by name, then type).
/// This order is the canonical one used by [`State`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundPredicate {
    name: String,
    predicate: PredicateId,
    objects: Vec<Object>,
}

impl GroundPredicate {
    /// Builds a new ground predicate.
    ///
    /// An error is returned if the number of objects does not match the arity of the predicate,
    /// or if an object type is not allowed in its slot.
    pub fn new(model: &Model, predicate: PredicateId, objects: Vec<Object>) -> Result<Self> {
        let pred = model.predicate(predicate);
        if pred.arity() != objects.len() {
            return Err(anyhow!(
                "predicate {} expects {} object(s), got {}",
                pred.name(),
                pred.arity(),
                objects.len()
            ));
        }
        for (param, obj) in pred.parameters().iter().zip(objects.iter()) {
            if !param.can_have_type(model, obj.object_type()) {
                return Err(anyhow!(
                    "object {} cannot be bound to parameter ?{} of predicate {}",
                    obj,
                    param.name(),
                    pred.name()
                ));
            }
        }
        Ok(Self::new_unchecked(model, predicate, objects))
    }

    pub(crate) fn new_unchecked(model: &Model, predicate: PredicateId, objects: Vec<Object>) -> Self {
        Self {
            name: model.predicate(predicate).name().to_string(),
            predicate,
            objects,
        }
    }

    /// Returns the predicate.
    pub fn predicate(&self) -> PredicateId {
        self.predicate
    }

    /// Returns the name of the predicate.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the objects bound to the predicate slots.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }
}

impl PartialOrd for GroundPredicate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroundPredicate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.objects.len().cmp(&other.objects.len()))
            .then_with(|| self.objects.cmp(&other.objects))
            .then_with(|| self.predicate.cmp(&other.predicate))
    }
}

impl Display for GroundPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.name)?;
        for o in self.objects.iter() {
            write!(f, " {}", o)?;
        }
        write!(f, ")")
    }
}

/// A set of ground predicates, kept sorted in canonical order and without duplicates.
///
/// States are never modified once built; applying an action produces a new state.
///
/// # Example
///
/// ```
/// # use amlearn::model::State;
/// let s = State::new(vec![]);
/// assert!(s.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct State(Vec<GroundPredicate>);

impl State {
    /// Builds a state from a collection of ground predicates.
    ///
    /// The predicates are sorted and duplicates are removed.
    pub fn new<I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = GroundPredicate>,
    {
        let mut v: Vec<GroundPredicate> = predicates.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    /// Returns `true` iff the state contains the ground predicate.
    pub fn contains(&self, predicate: &GroundPredicate) -> bool {
        self.0.binary_search(predicate).is_ok()
    }

    /// Iterates over the predicates in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &GroundPredicate> + '_ {
        self.0.iter()
    }

    /// Returns the number of predicates in the state.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` iff the state contains no predicate.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the union of this state and another one.
    pub fn union(&self, other: &State) -> State {
        State::new(self.0.iter().chain(other.0.iter()).cloned())
    }

    /// Returns the predicates of the state, in canonical order.
    pub fn as_slice(&self) -> &[GroundPredicate] {
        &self.0
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;
    use crate::model::Predicate;

    fn model() -> (Model, Vec<Object>) {
        let mut model = Model::new("m");
        let t = model.add_type("t", &[]).unwrap();
        let u = model.add_type("u", &[]).unwrap();
        let x = Parameter::new("x", vec![t]).unwrap();
        model.add_predicate(Predicate::new("b", vec![x.clone()])).unwrap();
        model.add_predicate(Predicate::new("a", vec![x.clone(), x])).unwrap();
        model.add_predicate(Predicate::new("a", vec![])).unwrap_err();
        let objects = vec![Object::new("o1", t), Object::new("o2", t), Object::new("o3", u)];
        (model, objects)
    }

    #[test]
    fn test_canonical_order() {
        let (model, o) = model();
        let b = model.predicate_by_name("b").unwrap();
        let a = model.predicate_by_name("a").unwrap();
        let gp_b1 = GroundPredicate::new(&model, b, vec![o[0].clone()]).unwrap();
        let gp_a12 = GroundPredicate::new(&model, a, vec![o[0].clone(), o[1].clone()]).unwrap();
        let gp_a21 = GroundPredicate::new(&model, a, vec![o[1].clone(), o[0].clone()]).unwrap();
        let s = State::new(vec![gp_b1.clone(), gp_a21.clone(), gp_a12.clone()]);
        assert_eq!(&[gp_a12, gp_a21, gp_b1], s.as_slice());
    }

    #[test]
    fn test_sort_invariance() {
        let (model, o) = model();
        let b = model.predicate_by_name("b").unwrap();
        let a = model.predicate_by_name("a").unwrap();
        let preds = vec![
            GroundPredicate::new(&model, b, vec![o[1].clone()]).unwrap(),
            GroundPredicate::new(&model, a, vec![o[0].clone(), o[1].clone()]).unwrap(),
            GroundPredicate::new(&model, b, vec![o[0].clone()]).unwrap(),
            GroundPredicate::new(&model, b, vec![o[1].clone()]).unwrap(),
        ];
        let mut reversed = preds.clone();
        reversed.reverse();
        let s1 = State::new(preds);
        let s2 = State::new(reversed);
        assert_eq!(s1, s2);
        assert_eq!(3, s1.len());
        assert_eq!(s1.as_slice(), s2.as_slice());
    }

    #[test]
    fn test_wrong_arity() {
        let (model, o) = model();
        let b = model.predicate_by_name("b").unwrap();
        assert!(GroundPredicate::new(&model, b, vec![]).is_err());
        assert!(GroundPredicate::new(&model, b, vec![o[0].clone(), o[1].clone()]).is_err());
    }

    #[test]
    fn test_wrong_type() {
        let (model, o) = model();
        let b = model.predicate_by_name("b").unwrap();
        assert!(GroundPredicate::new(&model, b, vec![o[2].clone()]).is_err());
    }

    #[test]
    fn test_contains_and_union() {
        let (model, o) = model();
        let b = model.predicate_by_name("b").unwrap();
        let gp1 = GroundPredicate::new(&model, b, vec![o[0].clone()]).unwrap();
        let gp2 = GroundPredicate::new(&model, b, vec![o[1].clone()]).unwrap();
        let s1 = State::new(vec![gp1.clone()]);
        let s2 = State::new(vec![gp2.clone(), gp1.clone()]);
        assert!(s1.contains(&gp1));
        assert!(!s1.contains(&gp2));
        assert_eq!(s2, s1.union(&s2));
        assert_eq!("{(b o1) (b o2)}", s2.to_string());
    }
}
