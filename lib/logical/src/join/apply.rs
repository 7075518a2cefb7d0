use crate::join::Proposal;
use crate::tree::{
    ConstructionNode, DataNode, FilterNode, InnerJoinNode, IntermediateQuery,
    IntermediateQueryBuilder, NodeId, QueryNode,
};
use crate::{ProposalApplicationError, QueryBuilderError};
use ontorel_model::{Substitution, Term, Variable};
use std::collections::BTreeSet;

/// Applies a [Proposal] to a query snapshot, producing a new snapshot.
///
/// The proposal's substitutions are merged and applied to the whole tree —
/// not just the join that produced them — before the marked leaves are
/// deleted. A join left with a single child collapses to that child, behind
/// a filter node when the join carried a condition. Node identifiers are not
/// stable across application.
///
/// Leaf removal is only honored for direct children of inner joins, which is
/// where [RedundantSelfJoinRule](crate::join::RedundantSelfJoinRule) marks
/// leaves.
pub fn apply_proposal(
    query: &IntermediateQuery,
    proposal: &Proposal,
) -> Result<IntermediateQuery, ProposalApplicationError> {
    let unifier = proposal.merged_unifier()?;
    let mut builder = IntermediateQuery::builder();
    copy_subtree(
        query,
        query.root(),
        None,
        &mut builder,
        &unifier,
        proposal.removed_leaves(),
    )?;
    Ok(builder.build()?)
}

fn copy_subtree(
    query: &IntermediateQuery,
    id: NodeId,
    parent: Option<NodeId>,
    builder: &mut IntermediateQueryBuilder,
    unifier: &Substitution,
    removed: &BTreeSet<NodeId>,
) -> Result<(), ProposalApplicationError> {
    match query.node(id) {
        QueryNode::InnerJoin(join) => {
            let survivors: Vec<NodeId> = query
                .children(id)
                .iter()
                .copied()
                .filter(|child| !removed.contains(child))
                .collect();
            match survivors.as_slice() {
                [] => Err(ProposalApplicationError::EmptyJoin(id)),
                [only] => {
                    // Degenerate join: hoist the single remaining child.
                    let parent = match join.filter() {
                        Some(condition) => Some(attach(
                            builder,
                            parent,
                            FilterNode::new(unifier.apply_to_expression(condition)),
                        )?),
                        None => parent,
                    };
                    copy_subtree(query, *only, parent, builder, unifier, removed)
                }
                _ => {
                    let rewritten = match join.filter() {
                        Some(condition) => {
                            InnerJoinNode::with_filter(unifier.apply_to_expression(condition))
                        }
                        None => InnerJoinNode::new(),
                    };
                    let new_id = attach(builder, parent, rewritten)?;
                    for &child in &survivors {
                        copy_subtree(query, child, Some(new_id), builder, unifier, removed)?;
                    }
                    Ok(())
                }
            }
        }
        QueryNode::Data(node) => {
            attach(builder, parent, DataNode::new(unifier.apply_to_atom(node.atom())))?;
            Ok(())
        }
        QueryNode::Filter(node) => {
            let new_id = attach(
                builder,
                parent,
                FilterNode::new(unifier.apply_to_expression(node.condition())),
            )?;
            for &child in query.children(id) {
                copy_subtree(query, child, Some(new_id), builder, unifier, removed)?;
            }
            Ok(())
        }
        QueryNode::Construction(node) => {
            let new_id = attach(builder, parent, rewrite_construction(node, unifier))?;
            for &child in query.children(id) {
                copy_subtree(query, child, Some(new_id), builder, unifier, removed)?;
            }
            Ok(())
        }
    }
}

fn attach(
    builder: &mut IntermediateQueryBuilder,
    parent: Option<NodeId>,
    node: impl Into<QueryNode>,
) -> Result<NodeId, QueryBuilderError> {
    match parent {
        None => builder.root(node),
        Some(parent) => builder.child(parent, node),
    }
}

/// Rewrites a construction node under a unifier. A projected variable mapped
/// to another variable is renamed; one mapped to a non-variable term stays
/// projected and the binding moves into the construction's substitution.
fn rewrite_construction(node: &ConstructionNode, unifier: &Substitution) -> ConstructionNode {
    let mut bindings: Vec<(Variable, Term)> = node
        .substitution()
        .iter()
        .map(|(variable, term)| {
            let variable = match unifier.get(variable) {
                Some(Term::Variable(renamed)) => renamed.clone(),
                _ => variable.clone(),
            };
            (variable, unifier.apply_to_term(term))
        })
        .collect();

    let mut projected = BTreeSet::new();
    for variable in node.projected_variables() {
        match unifier.get(variable) {
            None => {
                projected.insert(variable.clone());
            }
            Some(Term::Variable(renamed)) => {
                projected.insert(renamed.clone());
            }
            Some(term) => {
                projected.insert(variable.clone());
                bindings.push((variable.clone(), term.clone()));
            }
        }
    }
    ConstructionNode::with_substitution(projected, bindings.into_iter().collect())
}
