use ontorel_dbschema::DatabaseMetadata;
use ontorel_logical::tree::{
    ConstructionNode, DataNode, InnerJoinNode, IntermediateQuery, NodeId,
};
use ontorel_logical::{CardinalityPreservationMode, OptimizerSettings};
use ontorel_logical::join::RedundantSelfJoinRule;
use ontorel_model::{AtomPredicate, DataAtom, Literal, Term, Variable};

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

pub fn vt(name: &str) -> Term {
    Term::Variable(var(name))
}

pub fn lit(value: &str) -> Term {
    Term::from(Literal::from(value))
}

pub fn person_atom(arguments: [Term; 3]) -> DataAtom {
    DataAtom::new(AtomPredicate::new("person", 3), arguments.to_vec()).unwrap()
}

/// `person(id, ssn, name)` with the non-unique functional dependency
/// `ssn -> name`.
pub fn person_fd_metadata() -> DatabaseMetadata {
    let mut metadata = DatabaseMetadata::new();
    let person = metadata
        .create_relation("person", ["id", "ssn", "name"])
        .unwrap();
    person.add_functional_dependency(&[2], &[3]).unwrap();
    metadata
}

/// `person(id, ssn, name)` with a unique constraint on `id`.
pub fn person_key_metadata() -> DatabaseMetadata {
    let mut metadata = DatabaseMetadata::new();
    let person = metadata
        .create_relation("person", ["id", "ssn", "name"])
        .unwrap();
    person.add_unique_constraint(&[1]).unwrap();
    metadata
}

pub fn loose_rule() -> RedundantSelfJoinRule {
    RedundantSelfJoinRule::new(OptimizerSettings::new(CardinalityPreservationMode::Loose))
}

pub fn strict_rule() -> RedundantSelfJoinRule {
    RedundantSelfJoinRule::new(OptimizerSettings::new(CardinalityPreservationMode::Strict))
}

/// Two `person` accesses sharing the `ssn` variable `?s`, under a
/// construction projecting only `?n1`:
///
/// ```text
/// Construction: ?n1
///   InnerJoin
///     DataNode: person(?x1, ?s, ?n1)
///     DataNode: person(?x2, ?s, ?n2)
/// ```
pub fn shared_ssn_query() -> (IntermediateQuery, NodeId, NodeId, NodeId) {
    let mut builder = IntermediateQuery::builder();
    let root = builder.root(ConstructionNode::new([var("n1")])).unwrap();
    let join = builder.child(root, InnerJoinNode::new()).unwrap();
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
    (builder.build().unwrap(), join, left, right)
}
