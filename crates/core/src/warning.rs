//! Consistency warnings.
//!
//! Derived structures (adjacency, property index) can drift from entity data
//! when a multi-step mutation is interrupted or interleaved. Deletions keep
//! going when they find such drift and report it through these values; the
//! integrity audit reports the same values for drift it finds at rest.

use serde::Serialize;
use thiserror::Error;

use crate::types::{Direction, EdgeId, EndpointRole, EntityKind, NodeId, Relation};

/// A structural expectation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ConsistencyWarning {
    /// An edge id reachable from a node's adjacency is not in the edge set.
    #[error("edge {edge} listed in adjacency of node {node} is not in the edge set")]
    DanglingEdge {
        /// Node whose adjacency lists the edge
        node: NodeId,
        /// The missing edge
        edge: EdgeId,
    },

    /// An edge's recorded endpoint is not in the node set.
    #[error("edge {edge} refers to nonexistent {role} node {node}")]
    MissingEndpoint {
        /// Edge being inspected
        edge: EdgeId,
        /// Which endpoint
        role: EndpointRole,
        /// The missing node
        node: NodeId,
    },

    /// An edge has no recorded endpoint link at all.
    #[error("edge {edge} has no {role} link")]
    MissingLink {
        /// Edge being inspected
        edge: EdgeId,
        /// Which link is absent
        role: EndpointRole,
    },

    /// An edge is missing from one of its endpoint's edge sets.
    #[error("edge {edge} not listed in {direction} of node {node}")]
    MissingEdgeEntry {
        /// Endpoint node
        node: NodeId,
        /// Edge expected in the set
        edge: EdgeId,
        /// Which set
        direction: Direction,
    },

    /// A node's edge set lists an edge that does not connect to it.
    #[error("{direction} of node {node} lists unrelated edge {edge}")]
    StrayEdgeEntry {
        /// Node owning the set
        node: NodeId,
        /// Edge wrongly listed
        edge: EdgeId,
        /// Which set
        direction: Direction,
    },

    /// A weighted neighbor entry expected by an edge is absent.
    #[error("node {neighbor} not listed in {relation} of node {node}")]
    MissingNeighbor {
        /// Node owning the collection
        node: NodeId,
        /// Expected neighbor
        neighbor: NodeId,
        /// Which collection
        relation: Relation,
    },

    /// A weighted neighbor entry disagrees with the number of edges.
    #[error("{relation} of node {node}: neighbor {neighbor} has count {found}, expected {expected}")]
    CountMismatch {
        /// Node owning the collection
        node: NodeId,
        /// Neighbor entry
        neighbor: NodeId,
        /// Which collection
        relation: Relation,
        /// Count derived from the edge set (0 means the entry should not exist)
        expected: i64,
        /// Count found in the store
        found: i64,
    },

    /// Adjacency keys of a node were still populated when the node was dropped.
    #[error("node {node} still had entries under '{key}' when it was destroyed")]
    LeftoverAdjacency {
        /// Destroyed node
        node: NodeId,
        /// Store key that was not empty
        key: String,
    },

    /// An entity is indexed under a value it does not currently hold.
    #[error("{kind} {id} indexed under {key}={value} but does not hold that value")]
    StaleValueIndex {
        /// Node or edge
        kind: EntityKind,
        /// Raw entity id
        id: u64,
        /// Property key
        key: String,
        /// Indexed value
        value: String,
    },

    /// An entity holds a value it is not indexed under.
    #[error("{kind} {id} holds {key}={value} but is not indexed under it")]
    MissingValueIndex {
        /// Node or edge
        kind: EntityKind,
        /// Raw entity id
        id: u64,
        /// Property key
        key: String,
        /// Live value
        value: String,
    },

    /// An entity is in a presence set for a key it does not have.
    #[error("{kind} {id} in presence index of '{key}' without holding it")]
    StalePresence {
        /// Node or edge
        kind: EntityKind,
        /// Raw entity id
        id: u64,
        /// Property key
        key: String,
    },

    /// An entity has a key but is missing from its presence set.
    #[error("{kind} {id} holds '{key}' but is missing from its presence index")]
    MissingPresence {
        /// Node or edge
        kind: EntityKind,
        /// Raw entity id
        id: u64,
        /// Property key
        key: String,
    },
}
