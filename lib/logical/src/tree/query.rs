use crate::tree::{NodeId, QueryNode};
use crate::QueryBuilderError;
use ontorel_model::Variable;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug)]
struct NodeEntry {
    kind: QueryNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable snapshot of an intermediate query.
///
/// Nodes live in an arena and are addressed by [NodeId]; child order is fixed
/// at construction and drives every ordering-sensitive rewrite decision.
/// Rewrites never mutate a snapshot — they build a new one — so concurrent
/// `propose` calls over the same snapshot need no locking.
#[derive(Clone, Debug)]
pub struct IntermediateQuery {
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl IntermediateQuery {
    pub fn builder() -> IntermediateQueryBuilder {
        IntermediateQueryBuilder::new()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &QueryNode {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All nodes in depth-first, child-order preserving order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev());
            Some(id)
        })
    }

    /// The variables occurring in the subtree rooted at `id`.
    pub fn variables(&self, id: NodeId) -> BTreeSet<Variable> {
        let mut result = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.extend(self.node(current).own_variables());
            stack.extend(self.children(current));
        }
        result
    }

    /// The variables the node itself must read from its subtree.
    pub fn locally_required_variables(&self, id: NodeId) -> BTreeSet<Variable> {
        self.node(id).locally_required_variables()
    }

    /// The variables some node strictly above `id` will read: what each
    /// ancestor requires locally, plus everything occurring in the sibling
    /// subtrees hanging off the path to the root.
    pub fn variables_required_by_ancestors(&self, id: NodeId) -> BTreeSet<Variable> {
        let mut required = BTreeSet::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            required.extend(self.locally_required_variables(parent));
            for &sibling in self.children(parent) {
                if sibling != current {
                    required.extend(self.variables(sibling));
                }
            }
            current = parent;
        }
        required
    }

    fn fmt_subtree(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.node(id), indent = depth * 2)?;
        for &child in self.children(id) {
            self.fmt_subtree(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for IntermediateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_subtree(f, self.root, 0)
    }
}

/// Assembles an [IntermediateQuery] top-down: set a root, attach children,
/// then `build` — which checks that every inner join has at least two
/// children and every filter/construction exactly one.
#[derive(Debug, Default)]
pub struct IntermediateQueryBuilder {
    nodes: Vec<NodeEntry>,
    root: Option<NodeId>,
}

impl IntermediateQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root node.
    pub fn root(&mut self, node: impl Into<QueryNode>) -> Result<NodeId, QueryBuilderError> {
        if self.root.is_some() {
            return Err(QueryBuilderError::RootAlreadySet);
        }
        let id = self.push(node.into(), None);
        self.root = Some(id);
        Ok(id)
    }

    /// Attaches a child under `parent`, after any existing children.
    pub fn child(
        &mut self,
        parent: NodeId,
        node: impl Into<QueryNode>,
    ) -> Result<NodeId, QueryBuilderError> {
        let entry = self
            .nodes
            .get(parent.0)
            .ok_or(QueryBuilderError::UnknownNode(parent))?;
        match &entry.kind {
            QueryNode::Data(_) => return Err(QueryBuilderError::LeafParent(parent)),
            QueryNode::Filter(_) | QueryNode::Construction(_) => {
                if !entry.children.is_empty() {
                    return Err(QueryBuilderError::TooManyChildren(parent));
                }
            }
            QueryNode::InnerJoin(_) => {}
        }
        let id = self.push(node.into(), Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn build(self) -> Result<IntermediateQuery, QueryBuilderError> {
        let root = self.root.ok_or(QueryBuilderError::EmptyQuery)?;
        for (index, entry) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            match &entry.kind {
                QueryNode::InnerJoin(_) => {
                    if entry.children.len() < 2 {
                        return Err(QueryBuilderError::InvalidJoinArity {
                            node: id,
                            found: entry.children.len(),
                        });
                    }
                }
                QueryNode::Filter(_) | QueryNode::Construction(_) => {
                    if entry.children.is_empty() {
                        return Err(QueryBuilderError::MissingChild(id));
                    }
                }
                QueryNode::Data(_) => {}
            }
        }
        Ok(IntermediateQuery {
            nodes: self.nodes,
            root,
        })
    }

    fn push(&mut self, kind: QueryNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }
}
