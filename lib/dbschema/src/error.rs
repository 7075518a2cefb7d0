use crate::RelationId;
use thiserror::Error;

/// An error raised while building or querying schema metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("relation {0} is already defined")]
    DuplicateRelation(RelationId),
    #[error("relation {0} is not defined")]
    UnknownRelation(RelationId),
    #[error("relation {relation} has no attribute with index {index}")]
    UnknownAttribute { relation: RelationId, index: usize },
    #[error("constraint on {relation} lists no attributes")]
    EmptyConstraint { relation: RelationId },
    #[error("foreign key components must pair the same number of attributes")]
    ForeignKeyComponentMismatch,
    #[error("foreign key target on {relation} is not a unique constraint")]
    ForeignKeyTargetNotUnique { relation: RelationId },
}
