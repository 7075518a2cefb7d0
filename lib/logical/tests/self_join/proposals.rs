use crate::test_utils::*;
use ontorel_logical::tree::{ConstructionNode, DataNode, InnerJoinNode, IntermediateQuery};
use ontorel_model::{AtomPredicate, AtomUnificationError, DataAtom, Substitution};
use std::collections::BTreeSet;

#[test]
fn scenario_a_unifies_dependents_and_removes_the_redundant_leaf() {
    let (query, join, left, right) = shared_ssn_query();
    let metadata = person_fd_metadata();

    let proposal = loose_rule()
        .propose(&query, join, &metadata)
        .unwrap()
        .unwrap();

    // Same ssn forces the same name: ?n2 collapses onto ?n1.
    assert_eq!(
        proposal.unifiers(),
        &[Substitution::of(var("n2"), vt("n1"))]
    );
    // ?x2 is used nowhere else, so the second access is redundant; the first
    // one carries the projected ?n1 and survives.
    assert_eq!(proposal.removed_leaves(), &BTreeSet::from([right]));
    assert!(!proposal.removed_leaves().contains(&left));
}

#[test]
fn scenario_b_strict_mode_still_unifies_but_never_removes() {
    let (query, join, _, _) = shared_ssn_query();
    let metadata = person_fd_metadata();

    let proposal = strict_rule()
        .propose(&query, join, &metadata)
        .unwrap()
        .unwrap();

    assert_eq!(
        proposal.unifiers(),
        &[Substitution::of(var("n2"), vt("n1"))]
    );
    assert!(proposal.removed_leaves().is_empty());
}

#[test]
fn scenario_c_distinct_keys_fall_into_distinct_clusters() {
    let mut builder = IntermediateQuery::builder();
    let root = builder
        .root(ConstructionNode::new([var("id1"), var("id2")]))
        .unwrap();
    let join = builder.child(root, InnerJoinNode::new()).unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("id1"), vt("s1"), vt("n1")])),
        )
        .unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("id2"), vt("s2"), vt("n2")])),
        )
        .unwrap();
    let query = builder.build().unwrap();

    let outcome = loose_rule()
        .propose(&query, join, &person_key_metadata())
        .unwrap();
    assert!(outcome.is_none());
}

#[test]
fn fewer_than_two_leaves_yield_no_proposal() {
    let (query, join, left, _) = shared_ssn_query();
    let metadata = person_fd_metadata();

    let outcome = loose_rule()
        .propose_for_predicate(
            &query,
            join,
            &[left],
            &AtomPredicate::new("person", 3),
            &metadata,
        )
        .unwrap();
    assert!(outcome.is_none());
}

#[test]
fn unresolved_predicates_yield_no_proposal() {
    let (query, join, _, _) = shared_ssn_query();

    // No relation at all.
    let empty = ontorel_dbschema::DatabaseMetadata::new();
    assert!(loose_rule().propose(&query, join, &empty).unwrap().is_none());

    // A relation of the right name but the wrong arity does not back the
    // predicate either.
    let mut mismatched = ontorel_dbschema::DatabaseMetadata::new();
    mismatched.create_relation("person", ["id", "name"]).unwrap();
    assert!(loose_rule()
        .propose(&query, join, &mismatched)
        .unwrap()
        .is_none());
}

#[test]
fn proposals_are_deterministic() {
    let metadata = person_fd_metadata();

    let (first_query, first_join, _, _) = shared_ssn_query();
    let (second_query, second_join, _, _) = shared_ssn_query();

    let first = loose_rule()
        .propose(&first_query, first_join, &metadata)
        .unwrap();
    let second = loose_rule()
        .propose(&second_query, second_join, &metadata)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_cluster_keeps_a_survivor() {
    let mut builder = IntermediateQuery::builder();
    let join = builder.root(InnerJoinNode::new()).unwrap();
    let first = builder
        .child(
            join,
            DataNode::new(person_atom([vt("x1"), vt("s"), vt("n1")])),
        )
        .unwrap();
    let second = builder
        .child(
            join,
            DataNode::new(person_atom([vt("x2"), vt("t"), vt("m1")])),
        )
        .unwrap();
    let third = builder
        .child(
            join,
            DataNode::new(person_atom([vt("x3"), vt("s"), vt("n2")])),
        )
        .unwrap();
    let fourth = builder
        .child(
            join,
            DataNode::new(person_atom([vt("x4"), vt("t"), vt("m2")])),
        )
        .unwrap();
    let query = builder.build().unwrap();

    let proposal = loose_rule()
        .propose(&query, join, &person_fd_metadata())
        .unwrap()
        .unwrap();

    // One unifier per cluster, in child order.
    assert_eq!(
        proposal.unifiers(),
        &[
            Substitution::of(var("n2"), vt("n1")),
            Substitution::of(var("m2"), vt("m1")),
        ]
    );
    // Every leaf is removable, so each cluster keeps its first leaf.
    assert_eq!(proposal.removed_leaves(), &BTreeSet::from([third, fourth]));
    assert!(!proposal.removed_leaves().contains(&first));
    assert!(!proposal.removed_leaves().contains(&second));
}

#[test]
fn cooccurring_variables_block_removal() {
    // ?x occurs in both leaves, so neither id position is unobservable.
    let mut builder = IntermediateQuery::builder();
    let join = builder.root(InnerJoinNode::new()).unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x"), vt("s"), vt("n1")])),
        )
        .unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x"), vt("s"), vt("n2")])),
        )
        .unwrap();
    let query = builder.build().unwrap();

    let proposal = loose_rule()
        .propose(&query, join, &person_fd_metadata())
        .unwrap()
        .unwrap();
    assert_eq!(
        proposal.unifiers(),
        &[Substitution::of(var("n2"), vt("n1"))]
    );
    assert!(proposal.removed_leaves().is_empty());
}

#[test]
fn join_condition_variables_block_removal_of_their_leaf() {
    let mut builder = IntermediateQuery::builder();
    let root = builder.root(ConstructionNode::new([var("n1")])).unwrap();
    let join = builder
        .child(
            root,
            InnerJoinNode::with_filter(ontorel_model::Expression::equality(
                vt("x2"),
                lit("42"),
            )),
        )
        .unwrap();
    let left = builder
        .child(
            join,
            DataNode::new(person_atom([vt("x1"), vt("s"), vt("n1")])),
        )
        .unwrap();
    let right = builder
        .child(
            join,
            DataNode::new(person_atom([vt("x2"), vt("s"), vt("n2")])),
        )
        .unwrap();
    let query = builder.build().unwrap();

    let proposal = loose_rule()
        .propose(&query, join, &person_fd_metadata())
        .unwrap()
        .unwrap();

    // ?x2 feeds the join condition, so only the first access is removable.
    assert_eq!(proposal.removed_leaves(), &BTreeSet::from([left]));
    assert!(!proposal.removed_leaves().contains(&right));
}

#[test]
fn incompatible_dependent_constants_fail_the_whole_call() {
    let mut builder = IntermediateQuery::builder();
    let join = builder.root(InnerJoinNode::new()).unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x1"), vt("s"), lit("alice")])),
        )
        .unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x2"), vt("s"), lit("bob")])),
        )
        .unwrap();
    let query = builder.build().unwrap();

    let err = loose_rule()
        .propose(&query, join, &person_fd_metadata())
        .unwrap_err();
    assert!(matches!(err, AtomUnificationError::ConstantClash(_, _)));
}

#[test]
fn identical_ground_dependents_yield_no_unifier() {
    let mut builder = IntermediateQuery::builder();
    let join = builder.root(InnerJoinNode::new()).unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x1"), vt("s"), lit("alice")])),
        )
        .unwrap();
    let right = builder
        .child(
            join,
            DataNode::new(person_atom([vt("x2"), vt("s"), lit("alice")])),
        )
        .unwrap();
    let query = builder.build().unwrap();
    let metadata = person_fd_metadata();

    // Nothing to unify, nothing removable: no proposal at all.
    assert!(strict_rule()
        .propose(&query, join, &metadata)
        .unwrap()
        .is_none());

    // Under the loose mode the second access is still redundant.
    let proposal = loose_rule()
        .propose(&query, join, &metadata)
        .unwrap()
        .unwrap();
    assert!(proposal.unifiers().is_empty());
    assert_eq!(proposal.removed_leaves(), &BTreeSet::from([right]));
}

#[test]
fn multi_predicate_joins_union_per_predicate_outcomes() {
    let mut metadata = person_fd_metadata();
    let employment = metadata
        .create_relation("employment", ["id", "person", "dept"])
        .unwrap();
    employment.add_functional_dependency(&[2], &[3]).unwrap();

    let employment_atom = |id: &str, person: &str, dept: &str| {
        DataAtom::new(
            AtomPredicate::new("employment", 3),
            vec![vt(id), vt(person), vt(dept)],
        )
        .unwrap()
    };

    let mut builder = IntermediateQuery::builder();
    let join = builder.root(InnerJoinNode::new()).unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x1"), vt("s"), vt("n1")])),
        )
        .unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x2"), vt("s"), vt("n2")])),
        )
        .unwrap();
    builder
        .child(join, DataNode::new(employment_atom("e1", "p", "d1")))
        .unwrap();
    let fourth = builder
        .child(join, DataNode::new(employment_atom("e2", "p", "d2")))
        .unwrap();
    let query = builder.build().unwrap();

    let proposal = loose_rule()
        .propose(&query, join, &metadata)
        .unwrap()
        .unwrap();

    assert_eq!(
        proposal.unifiers(),
        &[
            Substitution::of(var("n2"), vt("n1")),
            Substitution::of(var("d2"), vt("d1")),
        ]
    );
    assert!(proposal.removed_leaves().contains(&fourth));
    assert_eq!(proposal.removed_leaves().len(), 2);
}
