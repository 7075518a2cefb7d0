use crate::join::Proposal;
use crate::tree::{DataNode, IntermediateQuery, NodeId, QueryNode};
use crate::{CardinalityPreservationMode, OptimizerSettings};
use log::debug;
use ontorel_dbschema::{DatabaseMetadata, FunctionalDependency};
use ontorel_model::{
    unify_terms, AtomPredicate, AtomUnificationError, DataAtom, Substitution, Term, Variable,
};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::collections::BTreeSet;

/// Uses the functional dependencies of a relation joined with itself to
///   (1) unify terms a dependency forces equal (a functional dependency
///       generates equalities) and
///   (2) detect redundant operands of the self-join and propose their
///       removal.
///
/// Removal changes how often an answer may be reported, so no leaf is ever
/// removed unless the cardinality-preservation mode is
/// [Loose](CardinalityPreservationMode::Loose). The unifying substitutions
/// only rename tuples and are produced in either mode.
///
/// The rule is a stateless value; it reads the tree and the metadata and
/// returns a [Proposal] without mutating anything, so independent calls over
/// consistent snapshots may run concurrently.
///
/// When several functional dependencies hold on one relation, each one's
/// clusters decide removals independently.
/// TODO: reconcile removal decisions across dependencies of one relation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedundantSelfJoinRule {
    settings: OptimizerSettings,
}

impl RedundantSelfJoinRule {
    pub fn new(settings: OptimizerSettings) -> Self {
        Self { settings }
    }

    /// Groups the direct data children of `join` by predicate and unions the
    /// per-predicate outcomes into one proposal.
    ///
    /// A unification failure aborts the whole call; the caller should leave
    /// the join unmodified — rewriting is best-effort and the unoptimized
    /// tree stays correct.
    pub fn propose(
        &self,
        query: &IntermediateQuery,
        join: NodeId,
        metadata: &DatabaseMetadata,
    ) -> Result<Option<Proposal>, AtomUnificationError> {
        let mut groups: Vec<(AtomPredicate, Vec<NodeId>)> = Vec::new();
        for &child in query.children(join) {
            if let Some(data) = query.node(child).as_data() {
                let predicate = data.atom().predicate();
                match groups.iter_mut().find(|entry| entry.0 == *predicate) {
                    Some(entry) => entry.1.push(child),
                    None => groups.push((predicate.clone(), vec![child])),
                }
            }
        }

        let mut proposal = Proposal::default();
        for (predicate, leaves) in &groups {
            if let Some(outcome) =
                self.propose_for_predicate(query, join, leaves, predicate, metadata)?
            {
                proposal.absorb(outcome);
            }
        }
        Ok((!proposal.is_empty()).then_some(proposal))
    }

    /// Proposes a rewrite for the leaves of `join` sharing one predicate.
    ///
    /// Returns `Ok(None)` when fewer than two leaves share the predicate or
    /// when the predicate is not backed by a relation of `metadata` (derived
    /// and view predicates are left alone).
    pub fn propose_for_predicate(
        &self,
        query: &IntermediateQuery,
        join: NodeId,
        leaves: &[NodeId],
        predicate: &AtomPredicate,
        metadata: &DatabaseMetadata,
    ) -> Result<Option<Proposal>, AtomUnificationError> {
        if leaves.len() < 2 {
            return Ok(None);
        }
        let Some(relation) = metadata.relation_for_predicate(predicate) else {
            return Ok(None);
        };

        let constraints = relation.all_functional_dependencies();
        let mut unifiers = Vec::new();
        let mut clustered = Vec::with_capacity(constraints.len());
        for constraint in &constraints {
            let clusters = cluster_by_determinant(query, leaves, constraint);
            unifiers.extend(extract_dependent_unifiers(query, constraint, &clusters)?);
            clustered.push((constraint, clusters));
        }

        let removed_leaves = self.select_leaves_to_remove(query, join, predicate, &clustered);
        if unifiers.is_empty() && removed_leaves.is_empty() {
            return Ok(None);
        }
        debug!(
            "self-join rewrite on {predicate}: {} unifier(s), {} leaf removal(s)",
            unifiers.len(),
            removed_leaves.len()
        );
        Ok(Some(Proposal::new(unifiers, removed_leaves)))
    }

    /// Leaf removal, gated behind the loose cardinality mode.
    fn select_leaves_to_remove(
        &self,
        query: &IntermediateQuery,
        join: NodeId,
        predicate: &AtomPredicate,
        clustered: &[(&FunctionalDependency, Vec<Vec<NodeId>>)],
    ) -> BTreeSet<NodeId> {
        if self.settings.cardinality_preservation != CardinalityPreservationMode::Loose {
            return BTreeSet::new();
        }

        let blocked = required_and_cooccurring_variables(query, join);
        let mut removed = BTreeSet::new();
        for (constraint, clusters) in clustered {
            let independent = independent_positions(predicate, constraint);
            for cluster in clusters {
                select_from_cluster(query, cluster, &independent, &blocked, &mut removed);
            }
        }
        removed
    }
}

fn leaf_atom(query: &IntermediateQuery, leaf: NodeId) -> Option<&DataAtom> {
    query.node(leaf).as_data().map(DataNode::atom)
}

/// Partitions `leaves` into clusters whose terms at the constraint's
/// determinant positions are pairwise identical (structural equality, not
/// unifiability). Cluster membership and cluster order both follow the
/// join's original child order.
fn cluster_by_determinant(
    query: &IntermediateQuery,
    leaves: &[NodeId],
    constraint: &FunctionalDependency,
) -> Vec<Vec<NodeId>> {
    let determinant_positions: Vec<usize> = constraint
        .determinants()
        .iter()
        .map(|attribute| attribute.index() - 1)
        .collect();

    let mut clusters: Vec<Vec<NodeId>> = Vec::new();
    let mut cluster_by_key: FxHashMap<Vec<Term>, usize> = FxHashMap::default();
    for &leaf in leaves {
        let Some(atom) = leaf_atom(query, leaf) else {
            continue;
        };
        let key: Vec<Term> = determinant_positions
            .iter()
            .map(|&position| atom.arguments()[position].clone())
            .collect();
        match cluster_by_key.entry(key) {
            Entry::Occupied(entry) => clusters[*entry.get()].push(leaf),
            Entry::Vacant(entry) => {
                entry.insert(clusters.len());
                clusters.push(vec![leaf]);
            }
        }
    }
    clusters
}

/// Derives the substitutions unifying the dependent terms within each
/// cluster of size two or more. The first leaf (child order) is the
/// reference; every other leaf unifies against it, one dependent attribute
/// at a time. Empty substitutions are dropped; a unification failure aborts
/// the whole computation.
fn extract_dependent_unifiers(
    query: &IntermediateQuery,
    constraint: &FunctionalDependency,
    clusters: &[Vec<NodeId>],
) -> Result<Vec<Substitution>, AtomUnificationError> {
    let dependent_positions: Vec<usize> = constraint
        .dependents()
        .iter()
        .map(|attribute| attribute.index() - 1)
        .collect();

    let mut unifiers = Vec::new();
    for cluster in clusters {
        let Some((&reference, rest)) = cluster.split_first() else {
            continue;
        };
        let Some(reference_atom) = leaf_atom(query, reference) else {
            continue;
        };
        for &leaf in rest {
            let Some(atom) = leaf_atom(query, leaf) else {
                continue;
            };
            let unifier = unify_dependent_terms(reference_atom, atom, &dependent_positions)?;
            if !unifier.is_empty() {
                unifiers.push(unifier);
            }
        }
    }
    Ok(unifiers)
}

/// Unifies the two atoms at the given positions, giving preference to the
/// variables of the left (reference) atom.
fn unify_dependent_terms(
    left: &DataAtom,
    right: &DataAtom,
    positions: &[usize],
) -> Result<Substitution, AtomUnificationError> {
    let mut unifier = Substitution::empty();
    for &position in positions {
        let step = unify_terms(&left.arguments()[position], &right.arguments()[position])?;
        unifier = unifier.merge(&step)?;
    }
    Ok(unifier)
}

/// Argument positions that are neither determinant nor dependent under the
/// constraint (0-based).
fn independent_positions(
    predicate: &AtomPredicate,
    constraint: &FunctionalDependency,
) -> BTreeSet<usize> {
    let constrained: BTreeSet<usize> = constraint
        .determinants()
        .iter()
        .chain(constraint.dependents())
        .map(|attribute| attribute.index() - 1)
        .collect();
    (0..predicate.arity())
        .filter(|position| !constrained.contains(position))
        .collect()
}

/// Marks the removable leaves of one cluster, keeping at least one
/// representative access to the relation: if every leaf is removable, the
/// first one survives.
fn select_from_cluster(
    query: &IntermediateQuery,
    cluster: &[NodeId],
    independent: &BTreeSet<usize>,
    blocked: &BTreeSet<Variable>,
    removed: &mut BTreeSet<NodeId>,
) {
    if cluster.len() < 2 {
        return;
    }
    let removable: Vec<NodeId> = cluster
        .iter()
        .copied()
        .filter(|&leaf| is_removable(query, leaf, independent, blocked))
        .collect();
    let keep_first = removable.len() == cluster.len();
    removed.extend(removable.into_iter().skip(usize::from(keep_first)));
}

/// A leaf is removable iff each of its independent-position arguments is a
/// variable used nowhere else: such a variable carries no observable
/// binding, so dropping the leaf cannot change any reported answer (only
/// multiplicities).
fn is_removable(
    query: &IntermediateQuery,
    leaf: NodeId,
    independent: &BTreeSet<usize>,
    blocked: &BTreeSet<Variable>,
) -> bool {
    let Some(atom) = leaf_atom(query, leaf) else {
        return false;
    };
    independent
        .iter()
        .all(|&position| match &atom.arguments()[position] {
            Term::Variable(variable) => !blocked.contains(variable),
            _ => false,
        })
}

/// Variables whose bindings must survive the rewrite: those read above the
/// join, those the join's own condition needs, and those occurring more than
/// once among the join's children. Occurrences within one data leaf count
/// separately; any other child contributes each of its subtree variables
/// once.
fn required_and_cooccurring_variables(
    query: &IntermediateQuery,
    join: NodeId,
) -> BTreeSet<Variable> {
    let mut result = query.variables_required_by_ancestors(join);
    result.extend(query.locally_required_variables(join));

    let mut occurrences: FxHashMap<Variable, usize> = FxHashMap::default();
    for &child in query.children(join) {
        match query.node(child) {
            QueryNode::Data(data) => {
                for argument in data.atom().arguments() {
                    for variable in argument.variables() {
                        *occurrences.entry(variable).or_default() += 1;
                    }
                }
            }
            _ => {
                for variable in query.variables(child) {
                    *occurrences.entry(variable).or_default() += 1;
                }
            }
        }
    }
    result.extend(
        occurrences
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(variable, _)| variable),
    );
    result
}
