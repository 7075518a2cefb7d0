use crate::tree::NodeId;
use ontorel_model::AtomUnificationError;
use thiserror::Error;

/// An error raised while assembling an intermediate query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryBuilderError {
    #[error("the query root is already set")]
    RootAlreadySet,
    #[error("the query has no root")]
    EmptyQuery,
    #[error("node {0} does not belong to this builder")]
    UnknownNode(NodeId),
    #[error("data node {0} cannot take children")]
    LeafParent(NodeId),
    #[error("node {0} can only take a single child")]
    TooManyChildren(NodeId),
    #[error("node {0} requires a child")]
    MissingChild(NodeId),
    #[error("inner join {node} requires at least two children, found {found}")]
    InvalidJoinArity { node: NodeId, found: usize },
}

/// An error raised while applying a proposal to a query snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProposalApplicationError {
    /// The proposal's substitutions cannot be merged into one unifier. With
    /// proposals produced by a single rule invocation this indicates
    /// conflicting rewrites from independent constraints.
    #[error(transparent)]
    Unification(#[from] AtomUnificationError),
    /// Every child of the join was marked for removal.
    #[error("removing every child of join {0} would leave it empty")]
    EmptyJoin(NodeId),
    #[error(transparent)]
    Rebuild(#[from] QueryBuilderError),
}
