//! Store-backed adjacency index.
//!
//! Each node carries four derived collections:
//! - `in_edges` / `out_edges`: sets of incident edge ids
//! - `parents` / `children`: weighted sets mapping a neighbor id to the
//!   number of edges between the two nodes in that direction
//!
//! Weighted entries only ever hold positive counts. [`AdjacencyIndex::bump`]
//! is the single place counts change; it removes an entry the moment its
//! count reaches zero.

use std::collections::BTreeSet;

use kvgraph_core::{ConsistencyWarning, Direction, EdgeId, GraphError, NodeId, Relation, Result};
use kvgraph_storage::KvStore;

use super::keys::{parse_id, Keyspace};
use super::types::Neighbor;

/// Adjacency view over one graph's keyspace.
pub struct AdjacencyIndex<'a, S: KvStore> {
    store: &'a S,
    keys: &'a Keyspace,
}

impl<'a, S: KvStore> AdjacencyIndex<'a, S> {
    /// Adjacency view over `keys`.
    pub fn new(store: &'a S, keys: &'a Keyspace) -> Self {
        Self { store, keys }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Record `edge` from `source` to `target`.
    pub fn link(&self, source: NodeId, target: NodeId, edge: EdgeId) -> Result<()> {
        let member = edge.to_string();
        self.store.sadd(&self.keys.out_edges(source), &member)?;
        self.store.sadd(&self.keys.in_edges(target), &member)?;
        self.bump(&self.keys.children(source), &target.to_string(), 1)?;
        self.bump(&self.keys.parents(target), &source.to_string(), 1)?;
        Ok(())
    }

    /// Remove `edge` from both endpoints.
    pub fn unlink(
        &self,
        source: NodeId,
        target: NodeId,
        edge: EdgeId,
    ) -> Result<Vec<ConsistencyWarning>> {
        let mut warnings = self.unlink_outgoing(source, edge, Some(target))?;
        warnings.extend(self.unlink_incoming(target, edge, Some(source))?);
        Ok(warnings)
    }

    /// Source-side half of [`Self::unlink`]. Without a known target only
    /// the edge set is touched.
    pub fn unlink_outgoing(
        &self,
        source: NodeId,
        edge: EdgeId,
        target: Option<NodeId>,
    ) -> Result<Vec<ConsistencyWarning>> {
        let mut warnings = Vec::new();
        if !self
            .store
            .srem(&self.keys.out_edges(source), &edge.to_string())?
        {
            warnings.push(ConsistencyWarning::MissingEdgeEntry {
                node: source,
                edge,
                direction: Direction::Outgoing,
            });
        }
        if let Some(target) = target {
            if !self.release(&self.keys.children(source), &target.to_string())? {
                warnings.push(ConsistencyWarning::MissingNeighbor {
                    node: source,
                    neighbor: target,
                    relation: Relation::Children,
                });
            }
        }
        Ok(warnings)
    }

    /// Target-side half of [`Self::unlink`].
    pub fn unlink_incoming(
        &self,
        target: NodeId,
        edge: EdgeId,
        source: Option<NodeId>,
    ) -> Result<Vec<ConsistencyWarning>> {
        let mut warnings = Vec::new();
        if !self
            .store
            .srem(&self.keys.in_edges(target), &edge.to_string())?
        {
            warnings.push(ConsistencyWarning::MissingEdgeEntry {
                node: target,
                edge,
                direction: Direction::Incoming,
            });
        }
        if let Some(source) = source {
            if !self.release(&self.keys.parents(target), &source.to_string())? {
                warnings.push(ConsistencyWarning::MissingNeighbor {
                    node: target,
                    neighbor: source,
                    relation: Relation::Parents,
                });
            }
        }
        Ok(warnings)
    }

    /// Drop one edge from a node's edge set without touching neighbor
    /// counts. Used for ids that no longer name an edge.
    pub fn forget_edge(&self, node: NodeId, edge: EdgeId) -> Result<()> {
        let member = edge.to_string();
        self.store.srem(&self.keys.in_edges(node), &member)?;
        self.store.srem(&self.keys.out_edges(node), &member)?;
        Ok(())
    }

    /// Delete every adjacency key of `node`, reporting the ones that still
    /// held entries.
    pub fn clear(&self, node: NodeId) -> Result<Vec<ConsistencyWarning>> {
        let mut warnings = Vec::new();
        for key in self.keys.adjacency_keys(node) {
            if self.store.del(&key)? {
                warnings.push(ConsistencyWarning::LeftoverAdjacency { node, key });
            }
        }
        Ok(warnings)
    }

    /// Add `delta` to a weighted entry, removing it once it is no longer
    /// positive. Returns the resulting count (0 when removed).
    pub fn bump(&self, key: &str, member: &str, delta: i64) -> Result<i64> {
        let score = self.store.zincrby(key, member, delta)?;
        if score <= 0 {
            self.store.zrem(key, member)?;
            return Ok(0);
        }
        Ok(score)
    }

    /// Decrement an existing entry. Returns `false` if there was none, in
    /// which case nothing is written.
    fn release(&self, key: &str, member: &str) -> Result<bool> {
        if self.store.zscore(key, member)?.is_none() {
            return Ok(false);
        }
        self.bump(key, member, -1)?;
        Ok(true)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Edges leaving `node`, ascending.
    pub fn out_edges(&self, node: NodeId) -> Result<Vec<EdgeId>> {
        self.edge_set(&self.keys.out_edges(node))
    }

    /// Edges entering `node`, ascending.
    pub fn in_edges(&self, node: NodeId) -> Result<Vec<EdgeId>> {
        self.edge_set(&self.keys.in_edges(node))
    }

    /// Every edge touching `node` in either direction.
    pub fn incident_edges(&self, node: NodeId) -> Result<BTreeSet<EdgeId>> {
        let mut edges: BTreeSet<EdgeId> = self.in_edges(node)?.into_iter().collect();
        edges.extend(self.out_edges(node)?);
        Ok(edges)
    }

    /// Nodes `node` has edges to, with edge counts.
    pub fn children(&self, node: NodeId) -> Result<Vec<Neighbor>> {
        self.weighted(&self.keys.children(node))
    }

    /// Nodes with edges into `node`, with edge counts.
    pub fn parents(&self, node: NodeId) -> Result<Vec<Neighbor>> {
        self.weighted(&self.keys.parents(node))
    }

    fn edge_set(&self, key: &str) -> Result<Vec<EdgeId>> {
        let mut edges = self
            .store
            .smembers(key)?
            .iter()
            .map(|m| parse_id(key, m))
            .collect::<Result<Vec<EdgeId>>>()?;
        edges.sort_unstable();
        Ok(edges)
    }

    fn weighted(&self, key: &str) -> Result<Vec<Neighbor>> {
        self.store
            .zrange(key)?
            .into_iter()
            .map(|(member, score)| {
                Ok(Neighbor {
                    node: parse_id(key, &member)?,
                    edges: u64::try_from(score).map_err(|_| {
                        GraphError::corrupt(key, format!("non-positive count {}", score))
                    })?,
                })
            })
            .collect()
    }
}
