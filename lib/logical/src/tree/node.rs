use itertools::Itertools;
use ontorel_model::{DataAtom, Expression, Substitution, Variable};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a node inside an [IntermediateQuery](crate::tree::IntermediateQuery).
///
/// Identifiers are only meaningful for the snapshot that produced them;
/// applying a proposal yields a new snapshot with fresh identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A leaf accessing one relation's tuples through a [DataAtom].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataNode {
    atom: DataAtom,
}

impl DataNode {
    pub fn new(atom: DataAtom) -> Self {
        Self { atom }
    }

    pub fn atom(&self) -> &DataAtom {
        &self.atom
    }
}

/// A natural inner join of at least two children, with an optional explicit
/// filter condition. The node owns no terms beyond that condition; its
/// semantics is the join of its children's tuples on their shared variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InnerJoinNode {
    filter: Option<Expression>,
}

impl InnerJoinNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: Expression) -> Self {
        Self {
            filter: Some(filter),
        }
    }

    pub fn filter(&self) -> Option<&Expression> {
        self.filter.as_ref()
    }
}

/// Filters the tuples of its single child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterNode {
    condition: Expression,
}

impl FilterNode {
    pub fn new(condition: Expression) -> Self {
        Self { condition }
    }

    pub fn condition(&self) -> &Expression {
        &self.condition
    }
}

/// Projects a set of variables, possibly binding some of them through a
/// substitution (a projected variable absent from the substitution domain is
/// read from the child).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructionNode {
    projected: BTreeSet<Variable>,
    substitution: Substitution,
}

impl ConstructionNode {
    pub fn new(projected: impl IntoIterator<Item = Variable>) -> Self {
        Self {
            projected: projected.into_iter().collect(),
            substitution: Substitution::empty(),
        }
    }

    pub fn with_substitution(
        projected: impl IntoIterator<Item = Variable>,
        substitution: Substitution,
    ) -> Self {
        Self {
            projected: projected.into_iter().collect(),
            substitution,
        }
    }

    pub fn projected_variables(&self) -> &BTreeSet<Variable> {
        &self.projected
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }
}

/// A node of the intermediate query tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryNode {
    Data(DataNode),
    InnerJoin(InnerJoinNode),
    Filter(FilterNode),
    Construction(ConstructionNode),
}

impl QueryNode {
    pub fn as_data(&self) -> Option<&DataNode> {
        match self {
            QueryNode::Data(node) => Some(node),
            _ => None,
        }
    }

    /// Variables this node must read from below for its own semantics (a
    /// filter's condition, a projection's outputs, ...).
    pub fn locally_required_variables(&self) -> BTreeSet<Variable> {
        match self {
            QueryNode::Data(_) => BTreeSet::new(),
            QueryNode::InnerJoin(node) => {
                node.filter().map(Expression::variables).unwrap_or_default()
            }
            QueryNode::Filter(node) => node.condition().variables(),
            QueryNode::Construction(node) => {
                let bound: BTreeSet<&Variable> = node.substitution().domain().collect();
                let mut required: BTreeSet<Variable> = node
                    .projected_variables()
                    .iter()
                    .filter(|variable| !bound.contains(variable))
                    .cloned()
                    .collect();
                for (_, term) in node.substitution().iter() {
                    required.extend(term.variables());
                }
                required
            }
        }
    }

    /// Variables mentioned by the node itself, regardless of its children.
    pub(crate) fn own_variables(&self) -> BTreeSet<Variable> {
        match self {
            QueryNode::Data(node) => node.atom().variables(),
            QueryNode::InnerJoin(node) => {
                node.filter().map(Expression::variables).unwrap_or_default()
            }
            QueryNode::Filter(node) => node.condition().variables(),
            QueryNode::Construction(node) => {
                let mut variables = node.projected_variables().clone();
                for (variable, term) in node.substitution().iter() {
                    variables.insert(variable.clone());
                    variables.extend(term.variables());
                }
                variables
            }
        }
    }
}

impl From<DataNode> for QueryNode {
    fn from(node: DataNode) -> Self {
        QueryNode::Data(node)
    }
}

impl From<InnerJoinNode> for QueryNode {
    fn from(node: InnerJoinNode) -> Self {
        QueryNode::InnerJoin(node)
    }
}

impl From<FilterNode> for QueryNode {
    fn from(node: FilterNode) -> Self {
        QueryNode::Filter(node)
    }
}

impl From<ConstructionNode> for QueryNode {
    fn from(node: ConstructionNode) -> Self {
        QueryNode::Construction(node)
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Data(node) => write!(f, "DataNode: {}", node.atom()),
            QueryNode::InnerJoin(node) => match node.filter() {
                Some(condition) => write!(f, "InnerJoin: {condition}"),
                None => f.write_str("InnerJoin"),
            },
            QueryNode::Filter(node) => write!(f, "Filter: {}", node.condition()),
            QueryNode::Construction(node) => {
                write!(
                    f,
                    "Construction: {}",
                    node.projected_variables().iter().format(", ")
                )?;
                if !node.substitution().is_empty() {
                    write!(f, " {}", node.substitution())?;
                }
                Ok(())
            }
        }
    }
}
