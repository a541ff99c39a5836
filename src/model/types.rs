use std::fmt::Display;

/// The identifier of a type inside a [`Model`](crate::model::Model).
///
/// Identifiers are dense indexes given by the model at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    /// Returns the index of this type in its model.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An object type, with its (possibly empty) set of direct parents.
///
/// Types are built by [`Model::add_type`](crate::model::Model::add_type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub(crate) name: String,
    pub(crate) parents: Vec<TypeId>,
}

impl Type {
    /// Returns the name of the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the direct parents of the type.
    pub fn parents(&self) -> &[TypeId] {
        &self.parents
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A named object of a single type.
///
/// Objects are ordered by name first, then by type, which is the order used to sort ground predicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Object {
    name: String,
    object_type: TypeId,
}

impl Object {
    /// Builds a new object.
    pub fn new(name: &str, object_type: TypeId) -> Self {
        Self {
            name: name.to_string(),
            object_type,
        }
    }

    /// Returns the name of the object.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type of the object.
    pub fn object_type(&self) -> TypeId {
        self.object_type
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
