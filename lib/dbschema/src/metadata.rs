use crate::{
    ForeignKeyComponent, ForeignKeyConstraint, MetadataError, RelationDefinition, RelationId,
};
use ontorel_model::AtomPredicate;
use std::collections::BTreeMap;

/// Constraint metadata for a database schema.
///
/// Configuration loading populates it once; the rewriting core only reads it.
/// Snapshots are cheap to clone and safe to share across concurrent rewrite
/// calls.
#[derive(Clone, Debug, Default)]
pub struct DatabaseMetadata {
    relations: BTreeMap<RelationId, RelationDefinition>,
}

impl DatabaseMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a relation and returns it for further constraint declarations.
    pub fn create_relation(
        &mut self,
        name: impl Into<String>,
        attribute_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<&mut RelationDefinition, MetadataError> {
        let id = RelationId::new(name);
        if self.relations.contains_key(&id) {
            return Err(MetadataError::DuplicateRelation(id));
        }
        let definition = RelationDefinition::new(id.clone(), attribute_ids);
        Ok(self.relations.entry(id).or_insert(definition))
    }

    pub fn relation(&self, id: &RelationId) -> Option<&RelationDefinition> {
        self.relations.get(id)
    }

    pub fn relation_mut(&mut self, id: &RelationId) -> Option<&mut RelationDefinition> {
        self.relations.get_mut(id)
    }

    /// Resolves the relation backing an atom predicate: the names must match
    /// and the predicate's arity must equal the relation's. Derived or view
    /// predicates resolve to `None`.
    pub fn relation_for_predicate(&self, predicate: &AtomPredicate) -> Option<&RelationDefinition> {
        self.relations
            .get(&RelationId::new(predicate.name()))
            .filter(|relation| relation.arity() == predicate.arity())
    }

    /// Declares a foreign key from `local` to `referenced`, pairing 1-based
    /// attribute indices position-wise. The referenced attributes must form a
    /// declared unique constraint. A structurally identical redeclaration is
    /// dropped.
    pub fn add_foreign_key(
        &mut self,
        local: &RelationId,
        local_indexes: &[usize],
        referenced: &RelationId,
        referenced_indexes: &[usize],
    ) -> Result<(), MetadataError> {
        if local_indexes.len() != referenced_indexes.len() {
            return Err(MetadataError::ForeignKeyComponentMismatch);
        }
        let local_attributes = self
            .relations
            .get(local)
            .ok_or_else(|| MetadataError::UnknownRelation(local.clone()))?
            .resolve(local_indexes)?;
        let referenced_relation = self
            .relations
            .get(referenced)
            .ok_or_else(|| MetadataError::UnknownRelation(referenced.clone()))?;
        let referenced_attributes = referenced_relation.resolve(referenced_indexes)?;
        if !referenced_relation
            .unique_constraints()
            .iter()
            .any(|constraint| constraint.attributes() == referenced_attributes.as_slice())
        {
            return Err(MetadataError::ForeignKeyTargetNotUnique {
                relation: referenced.clone(),
            });
        }

        let components = local_attributes
            .into_iter()
            .zip(referenced_attributes)
            .map(|(local, referenced)| ForeignKeyComponent { local, referenced })
            .collect();
        if let Some(definition) = self.relations.get_mut(local) {
            definition.add_foreign_key(ForeignKeyConstraint::new(components));
        }
        Ok(())
    }
}
