use crate::Attribute;
use std::fmt;

/// A unique constraint: no two tuples of the relation agree on all the listed
/// attributes. Attribute order is the declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueConstraint {
    attributes: Vec<Attribute>,
}

impl UniqueConstraint {
    pub(crate) fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl fmt::Display for UniqueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNIQUE({})", join_ids(&self.attributes))
    }
}

/// A generalized (non-unique) functional dependency: tuples agreeing on the
/// determinant attributes also agree on the dependent attributes. Unlike a
/// unique constraint, the determinant need not be a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionalDependency {
    determinants: Vec<Attribute>,
    dependents: Vec<Attribute>,
}

impl FunctionalDependency {
    pub(crate) fn new(determinants: Vec<Attribute>, dependents: Vec<Attribute>) -> Self {
        Self {
            determinants,
            dependents,
        }
    }

    pub fn determinants(&self) -> &[Attribute] {
        &self.determinants
    }

    pub fn dependents(&self) -> &[Attribute] {
        &self.dependents
    }
}

impl fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            join_ids(&self.determinants),
            join_ids(&self.dependents)
        )
    }
}

/// A foreign key: ordered (local attribute, referenced attribute) pairs
/// targeting a unique constraint of the referenced relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    components: Vec<ForeignKeyComponent>,
}

impl ForeignKeyConstraint {
    pub(crate) fn new(components: Vec<ForeignKeyComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[ForeignKeyComponent] {
        &self.components
    }
}

/// One column pair of a [ForeignKeyConstraint].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKeyComponent {
    pub local: Attribute,
    pub referenced: Attribute,
}

fn join_ids(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(Attribute::id)
        .collect::<Vec<_>>()
        .join(", ")
}
