use crate::test_utils::*;
use ontorel_logical::join::{apply_proposal, Proposal};
use ontorel_logical::tree::{ConstructionNode, DataNode, InnerJoinNode, IntermediateQuery};
use ontorel_logical::ProposalApplicationError;
use ontorel_model::{Expression, Substitution};
use std::collections::BTreeSet;

#[test]
fn applying_a_proposal_collapses_the_degenerate_join() {
    let (query, join, _, _) = shared_ssn_query();
    let metadata = person_fd_metadata();

    let proposal = loose_rule()
        .propose(&query, join, &metadata)
        .unwrap()
        .unwrap();
    let rewritten = apply_proposal(&query, &proposal).unwrap();

    insta::assert_snapshot!(rewritten, @r"
    Construction: ?n1
      DataNode: person(?x1, ?s, ?n1)
    ");
}

#[test]
fn a_join_condition_survives_the_collapse_as_a_filter() {
    let mut builder = IntermediateQuery::builder();
    let root = builder.root(ConstructionNode::new([var("n1")])).unwrap();
    let join = builder
        .child(
            root,
            InnerJoinNode::with_filter(Expression::equality(vt("s"), lit("123-45-6789"))),
        )
        .unwrap();
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
    let query = builder.build().unwrap();

    let proposal = loose_rule()
        .propose(&query, join, &person_fd_metadata())
        .unwrap()
        .unwrap();
    let rewritten = apply_proposal(&query, &proposal).unwrap();

    insta::assert_snapshot!(rewritten, @r#"
    Construction: ?n1
      Filter: (?s = "123-45-6789")
        DataNode: person(?x1, ?s, ?n1)
    "#);
}

#[test]
fn substitutions_rewrite_the_whole_tree() {
    let (query, _, _, _) = shared_ssn_query();
    let proposal = Proposal::new(
        vec![Substitution::of(var("n2"), vt("n1"))],
        BTreeSet::new(),
    );

    let rewritten = apply_proposal(&query, &proposal).unwrap();
    insta::assert_snapshot!(rewritten, @r"
    Construction: ?n1
      InnerJoin
        DataNode: person(?x1, ?s, ?n1)
        DataNode: person(?x2, ?s, ?n1)
    ");
}

#[test]
fn ground_bindings_surface_in_the_construction_substitution() {
    let (query, _, _, _) = shared_ssn_query();
    let proposal = Proposal::new(
        vec![Substitution::of(var("n1"), lit("alice"))],
        BTreeSet::new(),
    );

    let rewritten = apply_proposal(&query, &proposal).unwrap();
    insta::assert_snapshot!(rewritten, @r#"
    Construction: ?n1 {?n1 := "alice"}
      InnerJoin
        DataNode: person(?x1, ?s, "alice")
        DataNode: person(?x2, ?s, ?n2)
    "#);
}

#[test]
fn larger_joins_keep_their_surviving_operands() {
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
            DataNode::new(person_atom([vt("x2"), vt("t"), vt("m1")])),
        )
        .unwrap();
    builder
        .child(
            join,
            DataNode::new(person_atom([vt("x3"), vt("s"), vt("n2")])),
        )
        .unwrap();
    builder
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
    let rewritten = apply_proposal(&query, &proposal).unwrap();

    insta::assert_snapshot!(rewritten, @r"
    InnerJoin
      DataNode: person(?x1, ?s, ?n1)
      DataNode: person(?x2, ?t, ?m1)
    ");
}

#[test]
fn removing_every_join_operand_is_rejected() {
    let (query, join, left, right) = shared_ssn_query();
    let proposal = Proposal::new(Vec::new(), BTreeSet::from([left, right]));

    let err = apply_proposal(&query, &proposal).unwrap_err();
    assert_eq!(err, ProposalApplicationError::EmptyJoin(join));
}

#[test]
fn conflicting_unifiers_are_rejected() {
    let (query, _, _, _) = shared_ssn_query();
    let proposal = Proposal::new(
        vec![
            Substitution::of(var("n1"), lit("alice")),
            Substitution::of(var("n1"), lit("bob")),
        ],
        BTreeSet::new(),
    );

    let err = apply_proposal(&query, &proposal).unwrap_err();
    assert!(matches!(err, ProposalApplicationError::Unification(_)));
}
