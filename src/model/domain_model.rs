use super::{Object, Operator, OperatorId, Predicate, PredicateId, Type, TypeId};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// The requirement flags of a planning domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Objects and parameters are typed.
    pub typing: bool,
    /// Preconditions may contain negative literals.
    pub negative_preconditions: bool,
    /// Preconditions may contain equality tests.
    pub equality: bool,
}

/// A planning domain: types, predicates, constants and operators.
///
/// Entities are referred to by dense identifiers ([`TypeId`], [`PredicateId`], [`OperatorId`])
/// given at insertion time. Names are unique among entities of the same kind.
///
/// # Example
///
/// ```
/// # use amlearn::model::{Model, Operator, Parameter};
/// let mut model = Model::new("switches");
/// let switch = model.add_type("switch", &[]).unwrap();
/// let param = Parameter::new("s", vec![switch]).unwrap();
/// let op = model.add_operator(Operator::new("turn-on", vec![param])).unwrap();
/// assert_eq!(op, model.operator_by_name("turn-on").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    requirements: Requirements,
    types: Vec<Type>,
    predicates: Vec<Predicate>,
    constants: Vec<Object>,
    operators: Vec<Operator>,
    type_ids: HashMap<String, usize>,
    predicate_ids: HashMap<String, usize>,
    operator_ids: HashMap<String, usize>,
}

impl Model {
    /// Builds an empty model.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            requirements: Requirements {
                typing: true,
                ..Requirements::default()
            },
            ..Self::default()
        }
    }

    /// Returns the name of the model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requirement flags.
    pub fn requirements(&self) -> Requirements {
        self.requirements
    }

    /// Sets the requirement flags.
    pub fn set_requirements(&mut self, requirements: Requirements) {
        self.requirements = requirements;
    }

    /// Adds a new type given its name and its direct parents.
    ///
    /// An error is returned if the name is already used or if a parent is unknown.
    pub fn add_type(&mut self, name: &str, parents: &[TypeId]) -> Result<TypeId> {
        if self.type_ids.contains_key(name) {
            return Err(anyhow!("type {} is defined twice", name));
        }
        if let Some(p) = parents.iter().find(|p| p.0 >= self.types.len()) {
            return Err(anyhow!("unknown parent type id {} for type {}", p.0, name));
        }
        self.types.push(Type {
            name: name.to_string(),
            parents: parents.to_vec(),
        });
        self.type_ids.insert(name.to_string(), self.types.len() - 1);
        Ok(TypeId(self.types.len() - 1))
    }

    /// Adds a parent to an existing type.
    ///
    /// This allows the definition of hierarchies whose types are declared in any order.
    pub fn add_parent_type(&mut self, t: TypeId, parent: TypeId) -> Result<()> {
        if t.0 >= self.types.len() || parent.0 >= self.types.len() {
            return Err(anyhow!("unknown type id"));
        }
        if !self.types[t.0].parents.contains(&parent) {
            self.types[t.0].parents.push(parent);
        }
        Ok(())
    }

    /// Adds a new predicate.
    ///
    /// An error is returned if the name is already used by another predicate.
    pub fn add_predicate(&mut self, predicate: Predicate) -> Result<PredicateId> {
        if self.predicate_ids.contains_key(predicate.name()) {
            return Err(anyhow!("predicate {} is defined twice", predicate.name()));
        }
        self.predicate_ids
            .insert(predicate.name().to_string(), self.predicates.len());
        self.predicates.push(predicate);
        Ok(PredicateId(self.predicates.len() - 1))
    }

    /// Adds a new constant and returns its index.
    pub fn add_constant(&mut self, constant: Object) -> Result<usize> {
        if self.constants.iter().any(|c| c.name() == constant.name()) {
            return Err(anyhow!("constant {} is defined twice", constant.name()));
        }
        self.constants.push(constant);
        Ok(self.constants.len() - 1)
    }

    /// Adds a new operator.
    ///
    /// An error is returned if the name is already used by another operator.
    pub fn add_operator(&mut self, operator: Operator) -> Result<OperatorId> {
        if self.operator_ids.contains_key(operator.name()) {
            return Err(anyhow!("operator {} is defined twice", operator.name()));
        }
        self.operator_ids
            .insert(operator.name().to_string(), self.operators.len());
        self.operators.push(operator);
        Ok(OperatorId(self.operators.len() - 1))
    }

    /// Returns the type with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this model.
    pub fn get_type(&self, t: TypeId) -> &Type {
        &self.types[t.0]
    }

    /// Returns the predicate with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this model.
    pub fn predicate(&self, p: PredicateId) -> &Predicate {
        &self.predicates[p.0]
    }

    /// Returns the operator with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this model.
    pub fn operator(&self, o: OperatorId) -> &Operator {
        &self.operators[o.0]
    }

    /// Returns a mutable reference to the operator with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this model.
    pub fn operator_mut(&mut self, o: OperatorId) -> &mut Operator {
        &mut self.operators[o.0]
    }

    /// Returns the constants of the model.
    pub fn constants(&self) -> &[Object] {
        &self.constants
    }

    /// Returns the id of a type given its name.
    pub fn type_by_name(&self, name: &str) -> Result<TypeId> {
        self.type_ids
            .get(name)
            .map(|i| TypeId(*i))
            .ok_or_else(|| anyhow!("no such type: {}", name))
    }

    /// Returns the id of a predicate given its name.
    pub fn predicate_by_name(&self, name: &str) -> Result<PredicateId> {
        self.predicate_ids
            .get(name)
            .map(|i| PredicateId(*i))
            .ok_or_else(|| anyhow!("no such predicate: {}", name))
    }

    /// Returns the id of an operator given its name.
    pub fn operator_by_name(&self, name: &str) -> Result<OperatorId> {
        self.operator_ids
            .get(name)
            .map(|i| OperatorId(*i))
            .ok_or_else(|| anyhow!("no such operator: {}", name))
    }

    /// Returns the index of a constant given its name.
    pub fn constant_by_name(&self, name: &str) -> Result<usize> {
        self.constants
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| anyhow!("no such constant: {}", name))
    }

    /// Iterates over the type ids, in insertion order.
    pub fn iter_type_ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.types.len()).map(TypeId)
    }

    /// Iterates over the predicate ids, in insertion order.
    pub fn iter_predicate_ids(&self) -> impl Iterator<Item = PredicateId> {
        (0..self.predicates.len()).map(PredicateId)
    }

    /// Iterates over the operator ids, in insertion order.
    pub fn iter_operator_ids(&self) -> impl Iterator<Item = OperatorId> {
        (0..self.operators.len()).map(OperatorId)
    }

    /// Returns the number of types.
    pub fn n_types(&self) -> usize {
        self.types.len()
    }

    /// Returns the number of predicates.
    pub fn n_predicates(&self) -> usize {
        self.predicates.len()
    }

    /// Returns the number of operators.
    pub fn n_operators(&self) -> usize {
        self.operators.len()
    }

    /// Returns `true` iff `sup` is `sub` or one of its (direct or indirect) parents.
    ///
    /// Cycles in the parent relation are tolerated.
    pub fn is_supertype_of(&self, sup: TypeId, sub: TypeId) -> bool {
        let mut visited = vec![false; self.types.len()];
        let mut to_visit = vec![sub];
        while let Some(t) = to_visit.pop() {
            if t == sup {
                return true;
            }
            if visited[t.0] {
                continue;
            }
            visited[t.0] = true;
            to_visit.extend(self.types[t.0].parents.iter().copied());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supertype_reflexive() {
        let mut model = Model::new("m");
        let t = model.add_type("t", &[]).unwrap();
        assert!(model.is_supertype_of(t, t));
    }

    #[test]
    fn test_supertype_transitive() {
        let mut model = Model::new("m");
        let object = model.add_type("object", &[]).unwrap();
        let vehicle = model.add_type("vehicle", &[object]).unwrap();
        let truck = model.add_type("truck", &[vehicle]).unwrap();
        let place = model.add_type("place", &[object]).unwrap();
        assert!(model.is_supertype_of(object, truck));
        assert!(model.is_supertype_of(vehicle, truck));
        assert!(!model.is_supertype_of(truck, vehicle));
        assert!(!model.is_supertype_of(place, truck));
    }

    #[test]
    fn test_supertype_cycle() {
        let mut model = Model::new("m");
        let a = model.add_type("a", &[]).unwrap();
        let b = model.add_type("b", &[a]).unwrap();
        let c = model.add_type("c", &[]).unwrap();
        model.add_parent_type(a, b).unwrap();
        assert!(model.is_supertype_of(a, b));
        assert!(model.is_supertype_of(b, a));
        assert!(!model.is_supertype_of(c, a));
    }

    #[test]
    fn test_duplicate_names() {
        let mut model = Model::new("m");
        let t = model.add_type("t", &[]).unwrap();
        assert!(model.add_type("t", &[]).is_err());
        model.add_operator(Operator::new("op", vec![])).unwrap();
        assert!(model.add_operator(Operator::new("op", vec![])).is_err());
        model.add_constant(Object::new("c", t)).unwrap();
        assert!(model.add_constant(Object::new("c", t)).is_err());
    }

    #[test]
    fn test_unknown_parent() {
        let mut model = Model::new("m");
        assert!(model.add_type("t", &[TypeId(3)]).is_err());
    }

    #[test]
    fn test_lookup_by_name() {
        let mut model = Model::new("m");
        let t = model.add_type("t", &[]).unwrap();
        let p = model.add_predicate(Predicate::new("p", vec![])).unwrap();
        model.add_constant(Object::new("c", t)).unwrap();
        assert_eq!(t, model.type_by_name("t").unwrap());
        assert_eq!(p, model.predicate_by_name("p").unwrap());
        assert_eq!(0, model.constant_by_name("c").unwrap());
        assert!(model.predicate_by_name("q").is_err());
    }
}
