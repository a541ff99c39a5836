use super::{Model, TypeId};
use anyhow::{anyhow, Result};
use std::fmt::Display;

/// The identifier of a predicate inside a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PredicateId(pub(crate) usize);

impl PredicateId {
    /// Returns the index of this predicate in its model.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A typed parameter, used by both predicates and operators.
///
/// The set of allowed types is never empty; a parameter admitting several types stands for a type union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    types: Vec<TypeId>,
}

impl Parameter {
    /// Builds a new parameter.
    ///
    /// An error is returned if the set of allowed types is empty.
    pub fn new(name: &str, types: Vec<TypeId>) -> Result<Self> {
        if types.is_empty() {
            return Err(anyhow!(
                r#"parameter "{}" must admit at least one type"#,
                name
            ));
        }
        Ok(Self {
            name: name.to_string(),
            types,
        })
    }

    /// Returns the name of the parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the allowed types of the parameter.
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    /// Returns `true` iff an object of type `t` may be bound to this parameter.
    pub fn can_have_type(&self, model: &Model, t: TypeId) -> bool {
        self.types.iter().any(|allowed| model.is_supertype_of(*allowed, t))
    }

    /// Returns `true` iff a value bound to this parameter may also be bound to `other`.
    ///
    /// This is the case when at least one of the types of this parameter is a subtype of a type of `other`.
    pub fn is_compatible_with(&self, model: &Model, other: &Parameter) -> bool {
        self.types.iter().any(|t| other.can_have_type(model, *t))
    }

    /// Returns `true` iff this parameter and `other` share an allowed type.
    pub fn shares_type_with(&self, other: &Parameter) -> bool {
        self.types.iter().any(|t| other.types.contains(t))
    }
}

/// A predicate, defined by a name and an ordered list of typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    name: String,
    parameters: Vec<Parameter>,
}

impl Predicate {
    /// Builds a new predicate.
    pub fn new(name: &str, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.to_string(),
            parameters,
        }
    }

    /// Returns the name of the predicate.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameters of the predicate.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the number of parameters of the predicate.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.name)?;
        for p in self.parameters.iter() {
            write!(f, " ?{}", p.name)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_type_set() {
        assert!(Parameter::new("x", vec![]).is_err());
    }

    #[test]
    fn test_type_union() {
        let mut model = Model::new("m");
        let t0 = model.add_type("t0", &[]).unwrap();
        let t1 = model.add_type("t1", &[]).unwrap();
        let t2 = model.add_type("t2", &[]).unwrap();
        let p = Parameter::new("x", vec![t0, t1]).unwrap();
        assert!(p.can_have_type(&model, t0));
        assert!(p.can_have_type(&model, t1));
        assert!(!p.can_have_type(&model, t2));
    }

    #[test]
    fn test_compatibility_with_subtype() {
        let mut model = Model::new("m");
        let vehicle = model.add_type("vehicle", &[]).unwrap();
        let truck = model.add_type("truck", &[vehicle]).unwrap();
        let p_truck = Parameter::new("t", vec![truck]).unwrap();
        let p_vehicle = Parameter::new("v", vec![vehicle]).unwrap();
        assert!(p_truck.is_compatible_with(&model, &p_vehicle));
        assert!(!p_vehicle.is_compatible_with(&model, &p_truck));
    }

    #[test]
    fn test_display() {
        let mut model = Model::new("m");
        let t = model.add_type("t", &[]).unwrap();
        let pred = Predicate::new(
            "at",
            vec![
                Parameter::new("x", vec![t]).unwrap(),
                Parameter::new("y", vec![t]).unwrap(),
            ],
        );
        assert_eq!("(at ?x ?y)", pred.to_string());
    }
}
