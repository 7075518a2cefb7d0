use crate::{
    ForeignKeyConstraint, FunctionalDependency, MetadataError, UniqueConstraint,
};
use std::fmt;

/// Identifier of a database relation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(String);

impl RelationId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attribute of a relation.
///
/// Identity is the pair (relation, index); indices are 1-based and contiguous
/// up to the relation's arity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Attribute {
    relation: RelationId,
    index: usize,
    id: String,
}

impl Attribute {
    pub(crate) fn new(relation: RelationId, index: usize, id: impl Into<String>) -> Self {
        Self {
            relation,
            index,
            id: id.into(),
        }
    }

    pub fn relation(&self) -> &RelationId {
        &self.relation
    }

    /// The 1-based position of this attribute within its relation.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.relation, self.id)
    }
}

/// Definition of a database relation: its attributes and the integrity
/// constraints declared on it.
///
/// Structurally identical constraints declared more than once collapse to a
/// single instance; the first declaration fixes the attribute order.
#[derive(Clone, Debug)]
pub struct RelationDefinition {
    id: RelationId,
    attributes: Vec<Attribute>,
    unique_constraints: Vec<UniqueConstraint>,
    functional_dependencies: Vec<FunctionalDependency>,
    foreign_keys: Vec<ForeignKeyConstraint>,
}

impl RelationDefinition {
    /// Creates a relation definition with 1-based, contiguous attributes.
    pub fn new(
        id: RelationId,
        attribute_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let attributes = attribute_ids
            .into_iter()
            .enumerate()
            .map(|(i, attribute_id)| Attribute::new(id.clone(), i + 1, attribute_id))
            .collect();
        Self {
            id,
            attributes,
            unique_constraints: Vec::new(),
            functional_dependencies: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn id(&self) -> &RelationId {
        &self.id
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by its 1-based index.
    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        index.checked_sub(1).and_then(|i| self.attributes.get(i))
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraint] {
        &self.unique_constraints
    }

    /// The declared non-unique functional dependencies.
    pub fn functional_dependencies(&self) -> &[FunctionalDependency] {
        &self.functional_dependencies
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyConstraint] {
        &self.foreign_keys
    }

    /// Declares a unique constraint over the given 1-based attribute indices.
    /// A structurally identical redeclaration is dropped.
    pub fn add_unique_constraint(&mut self, indexes: &[usize]) -> Result<(), MetadataError> {
        let attributes = self.resolve(indexes)?;
        let constraint = UniqueConstraint::new(attributes);
        if self.unique_constraints.contains(&constraint) {
            log::debug!("ignoring duplicate unique constraint on {}", self.id);
            return Ok(());
        }
        self.unique_constraints.push(constraint);
        Ok(())
    }

    /// Declares a functional dependency (determinants → dependents) over
    /// 1-based attribute indices. A structurally identical redeclaration is
    /// dropped.
    pub fn add_functional_dependency(
        &mut self,
        determinants: &[usize],
        dependents: &[usize],
    ) -> Result<(), MetadataError> {
        let determinants = self.resolve(determinants)?;
        let dependents = self.resolve(dependents)?;
        let constraint = FunctionalDependency::new(determinants, dependents);
        if self.functional_dependencies.contains(&constraint) {
            log::debug!("ignoring duplicate functional dependency on {}", self.id);
            return Ok(());
        }
        self.functional_dependencies.push(constraint);
        Ok(())
    }

    pub(crate) fn add_foreign_key(&mut self, constraint: ForeignKeyConstraint) {
        if self.foreign_keys.contains(&constraint) {
            log::debug!("ignoring duplicate foreign key on {}", self.id);
            return;
        }
        self.foreign_keys.push(constraint);
    }

    /// Every functional dependency that holds on this relation: the declared
    /// ones first, then one derived from each unique constraint (determinant
    /// = the key attributes, dependents = all remaining attributes), both in
    /// declaration order.
    pub fn all_functional_dependencies(&self) -> Vec<FunctionalDependency> {
        let derived = self.unique_constraints.iter().map(|constraint| {
            let dependents = self
                .attributes
                .iter()
                .filter(|attribute| !constraint.attributes().contains(attribute))
                .cloned()
                .collect();
            FunctionalDependency::new(constraint.attributes().to_vec(), dependents)
        });
        self.functional_dependencies
            .iter()
            .cloned()
            .chain(derived)
            .collect()
    }

    pub(crate) fn resolve(&self, indexes: &[usize]) -> Result<Vec<Attribute>, MetadataError> {
        if indexes.is_empty() {
            return Err(MetadataError::EmptyConstraint {
                relation: self.id.clone(),
            });
        }
        indexes
            .iter()
            .map(|&index| {
                self.attribute(index).cloned().ok_or_else(|| {
                    MetadataError::UnknownAttribute {
                        relation: self.id.clone(),
                        index,
                    }
                })
            })
            .collect()
    }
}
