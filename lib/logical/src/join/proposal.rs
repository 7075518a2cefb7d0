use crate::tree::NodeId;
use ontorel_model::{AtomUnificationError, Substitution};
use std::collections::BTreeSet;

/// A rewrite proposed by [RedundantSelfJoinRule](crate::join::RedundantSelfJoinRule):
/// substitutions unifying terms that a functional dependency forces equal,
/// plus data leaves proven redundant.
///
/// The rule never mutates the tree; the orchestrator applies a proposal with
/// [apply_proposal](crate::join::apply_proposal) — substitutions first, over
/// the whole surrounding tree, then leaf removal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Proposal {
    unifiers: Vec<Substitution>,
    removed_leaves: BTreeSet<NodeId>,
}

impl Proposal {
    pub fn new(unifiers: Vec<Substitution>, removed_leaves: BTreeSet<NodeId>) -> Self {
        Self {
            unifiers,
            removed_leaves,
        }
    }

    pub fn unifiers(&self) -> &[Substitution] {
        &self.unifiers
    }

    pub fn removed_leaves(&self) -> &BTreeSet<NodeId> {
        &self.removed_leaves
    }

    pub fn is_empty(&self) -> bool {
        self.unifiers.is_empty() && self.removed_leaves.is_empty()
    }

    /// Folds all unifiers into a single substitution entailing each of them.
    pub fn merged_unifier(&self) -> Result<Substitution, AtomUnificationError> {
        let mut merged = Substitution::empty();
        for unifier in &self.unifiers {
            merged = merged.merge(unifier)?;
        }
        Ok(merged)
    }

    pub(crate) fn absorb(&mut self, other: Proposal) {
        self.unifiers.extend(other.unifiers);
        self.removed_leaves.extend(other.removed_leaves);
    }
}
