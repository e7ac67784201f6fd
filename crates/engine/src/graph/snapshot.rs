//! Point-in-time dump of a graph.
//!
//! The snapshot is read primitive by primitive, so it is only consistent
//! when no writer runs concurrently.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kvgraph_core::{EdgeId, EntityKind, NodeId, Properties, Result};
use kvgraph_storage::KvStore;

use super::types::Neighbor;
use super::Graph;

/// One node as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Node id.
    pub id: NodeId,
    /// Property map.
    pub properties: Properties,
    /// Edges entering the node.
    pub in_edges: Vec<EdgeId>,
    /// Edges leaving the node.
    pub out_edges: Vec<EdgeId>,
    /// Weighted parents.
    pub parents: Vec<Neighbor>,
    /// Weighted children.
    pub children: Vec<Neighbor>,
}

/// One edge as stored. Links are optional so a damaged edge still shows up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    /// Edge id.
    pub id: EdgeId,
    /// Recorded source node.
    pub source: Option<NodeId>,
    /// Recorded target node.
    pub target: Option<NodeId>,
    /// Property map.
    pub properties: Properties,
}

/// Every node and edge of a graph, ordered by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Namespace the graph lives under.
    pub namespace: String,
    /// Id the next node will get.
    pub next_node_id: u64,
    /// Id the next edge will get.
    pub next_edge_id: u64,
    /// Nodes.
    pub nodes: Vec<NodeSnapshot>,
    /// Edges.
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    /// Number of nodes captured.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges captured.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a captured node.
    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }

    /// Look up a captured edge.
    pub fn edge(&self, id: EdgeId) -> Option<&EdgeSnapshot> {
        self.edges
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.edges[i])
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<S: KvStore> Graph<S> {
    /// Capture every node and edge with their derived structures.
    pub fn snapshot(&self) -> Result<GraphSnapshot> {
        let entities = self.entities();
        let adjacency = self.adjacency();
        let allocator = self.alloc();

        let mut nodes = Vec::new();
        for id in entities.members(EntityKind::Node)? {
            let node = NodeId::new(id);
            nodes.push(NodeSnapshot {
                id: node,
                properties: entities.all_properties(EntityKind::Node, id)?,
                in_edges: adjacency.in_edges(node)?,
                out_edges: adjacency.out_edges(node)?,
                parents: adjacency.parents(node)?,
                children: adjacency.children(node)?,
            });
        }

        let mut edges = Vec::new();
        for id in entities.members(EntityKind::Edge)? {
            let edge = EdgeId::new(id);
            let (source, target) = entities.links(edge)?;
            edges.push(EdgeSnapshot {
                id: edge,
                source,
                target,
                properties: entities.all_properties(EntityKind::Edge, id)?,
            });
        }

        debug!(
            namespace = %self.namespace(),
            nodes = nodes.len(),
            edges = edges.len(),
            "Graph snapshot taken"
        );
        Ok(GraphSnapshot {
            namespace: self.namespace().to_string(),
            next_node_id: allocator.peek(EntityKind::Node)?,
            next_edge_id: allocator.peek(EntityKind::Edge)?,
            nodes,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kvgraph_storage::MemoryStore;

    use super::*;

    fn setup() -> Graph<MemoryStore> {
        Graph::new(Arc::new(MemoryStore::new()))
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    #[test]
    fn empty_graph_empty_snapshot() {
        let g = setup();
        let snap = g.snapshot().unwrap();
        assert_eq!(snap.node_count(), 0);
        assert_eq!(snap.edge_count(), 0);
        assert_eq!(snap.next_node_id, 0);
        assert_eq!(snap.namespace, "rgr");
    }

    #[test]
    fn snapshot_captures_all_nodes_and_edges() {
        let g = setup();
        let a = g.add_node([("name", "A")]).unwrap();
        let b = g.add_node([("name", "B")]).unwrap();
        let c = g.add_node([("name", "C")]).unwrap();
        g.add_edge(a, b, [("rel", "E1")]).unwrap();
        g.add_edge(b, c, [("rel", "E2")]).unwrap();
        g.add_edge(a, c, [("rel", "E3")]).unwrap();

        let snap = g.snapshot().unwrap();
        assert_eq!(snap.node_count(), 3);
        assert_eq!(snap.edge_count(), 3);
        assert_eq!(snap.next_node_id, 3);
        assert_eq!(snap.next_edge_id, 3);

        let a_snap = snap.node(a.id()).unwrap();
        assert_eq!(a_snap.properties["name"], "A");
        assert_eq!(a_snap.out_edges, vec![EdgeId::new(0), EdgeId::new(2)]);
        assert_eq!(a_snap.children.len(), 2);
        assert!(a_snap.parents.is_empty());

        let e2 = snap.edge(EdgeId::new(1)).unwrap();
        assert_eq!(e2.source, Some(b.id()));
        assert_eq!(e2.target, Some(c.id()));
        assert_eq!(e2.properties["rel"], "E2");
    }

    #[test]
    fn snapshot_reflects_deletion() {
        let g = setup();
        let a = g.add_node([("name", "A")]).unwrap();
        let b = g.add_node([("name", "B")]).unwrap();
        g.add_edge(a, b, Properties::new()).unwrap();
        g.del_node(b).unwrap();

        let snap = g.snapshot().unwrap();
        assert_eq!(snap.node_count(), 1);
        assert_eq!(snap.edge_count(), 0);
        assert!(snap.node(b.id()).is_none());
        assert!(snap.node(a.id()).unwrap().children.is_empty());
        // Counters keep advancing past deleted ids
        assert_eq!(snap.next_node_id, 2);
    }

    #[test]
    fn snapshot_to_json() {
        let g = setup();
        let a = g.add_node([("name", "alice")]).unwrap();
        let b = g.add_node([("name", "bob")]).unwrap();
        g.add_edge(a, b, [("rel", "knows")]).unwrap();

        let json = g.snapshot().unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["properties"]["name"], "alice");
        assert_eq!(value["nodes"][0]["children"][0]["node"], 1);
        assert_eq!(value["nodes"][0]["children"][0]["edges"], 1);
        assert_eq!(value["edges"][0]["target"], 1);

        let back: GraphSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.edge_count(), 1);
    }
}
