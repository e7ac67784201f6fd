//! Entity handles and result types for the graph facade.
//!
//! [`Node`] and [`Edge`] are lightweight borrowed handles: an id plus a
//! reference to the owning [`Graph`]. Every accessor goes to the store, so
//! a handle never holds stale data; it may however outlive the entity it
//! names, in which case accessors fail with `UnknownEntity`.

use std::fmt;

use serde::{Deserialize, Serialize};

use kvgraph_core::{ConsistencyWarning, EdgeId, EntityKind, NodeId, Properties, Result};
use kvgraph_storage::KvStore;

use super::Graph;

/// A neighbor entry in a node's `parents` or `children`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The adjacent node.
    pub node: NodeId,
    /// Number of edges between the two nodes in this direction (always ≥ 1).
    pub edges: u64,
}

/// Outcome of a node or edge deletion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteReport {
    /// Edges removed, including those removed by the cascade.
    pub removed_edges: Vec<EdgeId>,
    /// Structural drift found along the way. Never aborts the deletion.
    pub warnings: Vec<ConsistencyWarning>,
}

impl DeleteReport {
    /// True when the deletion met no inconsistency.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: DeleteReport) {
        self.removed_edges.extend(other.removed_edges);
        self.warnings.extend(other.warnings);
    }
}

// =============================================================================
// Node handle
// =============================================================================

/// Handle to a node of a [`Graph`].
pub struct Node<'g, S: KvStore> {
    graph: &'g Graph<S>,
    id: NodeId,
}

impl<'g, S: KvStore> Node<'g, S> {
    pub(crate) fn new(graph: &'g Graph<S>, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// The node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whether the node still exists.
    pub fn exists(&self) -> Result<bool> {
        self.graph.has_node(self.id)
    }

    /// All properties of the node.
    pub fn properties(&self) -> Result<Properties> {
        self.graph.properties(EntityKind::Node, self.id.as_u64())
    }

    /// One property, if set.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.graph
            .get_property(EntityKind::Node, self.id.as_u64(), key)
    }

    /// Set a property, returning the value it replaced.
    pub fn set(&self, key: &str, value: &str) -> Result<Option<String>> {
        self.graph
            .set_property(EntityKind::Node, self.id.as_u64(), key, value)
    }

    /// Remove a property, returning the value it held.
    pub fn delete(&self, key: &str) -> Result<String> {
        self.graph
            .del_property(EntityKind::Node, self.id.as_u64(), key)
    }

    /// Nodes with edges into this node.
    pub fn parents(&self) -> Result<Vec<Neighbor>> {
        self.graph.ensure_node(self.id)?;
        self.graph.adjacency().parents(self.id)
    }

    /// Nodes this node has edges to.
    pub fn children(&self) -> Result<Vec<Neighbor>> {
        self.graph.ensure_node(self.id)?;
        self.graph.adjacency().children(self.id)
    }

    /// Edges entering this node, by id.
    pub fn in_edges(&self) -> Result<Vec<Edge<'g, S>>> {
        self.graph.ensure_node(self.id)?;
        let edges = self.graph.adjacency().in_edges(self.id)?;
        Ok(edges.into_iter().map(|e| Edge::new(self.graph, e)).collect())
    }

    /// Edges leaving this node, by id.
    pub fn out_edges(&self) -> Result<Vec<Edge<'g, S>>> {
        self.graph.ensure_node(self.id)?;
        let edges = self.graph.adjacency().out_edges(self.id)?;
        Ok(edges.into_iter().map(|e| Edge::new(self.graph, e)).collect())
    }
}

impl<S: KvStore> Clone for Node<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: KvStore> Copy for Node<'_, S> {}

impl<S: KvStore> fmt::Debug for Node<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("namespace", &self.graph.namespace())
            .field("id", &self.id)
            .finish()
    }
}

impl<S: KvStore> From<Node<'_, S>> for NodeId {
    fn from(node: Node<'_, S>) -> Self {
        node.id
    }
}

impl<S: KvStore> From<&Node<'_, S>> for NodeId {
    fn from(node: &Node<'_, S>) -> Self {
        node.id
    }
}

// =============================================================================
// Edge handle
// =============================================================================

/// Handle to an edge of a [`Graph`].
pub struct Edge<'g, S: KvStore> {
    graph: &'g Graph<S>,
    id: EdgeId,
}

impl<'g, S: KvStore> Edge<'g, S> {
    pub(crate) fn new(graph: &'g Graph<S>, id: EdgeId) -> Self {
        Self { graph, id }
    }

    /// The edge id.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Whether the edge still exists.
    pub fn exists(&self) -> Result<bool> {
        self.graph.has_edge(self.id)
    }

    /// All properties of the edge.
    pub fn properties(&self) -> Result<Properties> {
        self.graph.properties(EntityKind::Edge, self.id.as_u64())
    }

    /// One property, if set.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.graph
            .get_property(EntityKind::Edge, self.id.as_u64(), key)
    }

    /// Set a property, returning the value it replaced.
    pub fn set(&self, key: &str, value: &str) -> Result<Option<String>> {
        self.graph
            .set_property(EntityKind::Edge, self.id.as_u64(), key, value)
    }

    /// Remove a property, returning the value it held.
    pub fn delete(&self, key: &str) -> Result<String> {
        self.graph
            .del_property(EntityKind::Edge, self.id.as_u64(), key)
    }

    /// Recorded (source, target) ids.
    pub fn endpoints(&self) -> Result<(NodeId, NodeId)> {
        self.graph.endpoints(self.id)
    }

    /// The node this edge leaves.
    pub fn in_node(&self) -> Result<Node<'g, S>> {
        let (source, _) = self.endpoints()?;
        self.graph.node(source)
    }

    /// The node this edge enters.
    pub fn out_node(&self) -> Result<Node<'g, S>> {
        let (_, target) = self.endpoints()?;
        self.graph.node(target)
    }
}

impl<S: KvStore> Clone for Edge<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: KvStore> Copy for Edge<'_, S> {}

impl<S: KvStore> fmt::Debug for Edge<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("namespace", &self.graph.namespace())
            .field("id", &self.id)
            .finish()
    }
}

impl<S: KvStore> From<Edge<'_, S>> for EdgeId {
    fn from(edge: Edge<'_, S>) -> Self {
        edge.id
    }
}

impl<S: KvStore> From<&Edge<'_, S>> for EdgeId {
    fn from(edge: &Edge<'_, S>) -> Self {
        edge.id
    }
}
