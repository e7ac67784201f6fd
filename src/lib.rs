//! kvgraph: a property graph on key-value store primitives
//!
//! Nodes and directed edges carry flat string properties. Everything,
//! including adjacency and a secondary property index, is stored through
//! the small [`KvStore`] primitive set, so any store that offers scalars,
//! sets, weighted sets and field maps can host a graph.
//!
//! Crates:
//! - `kvgraph-core`: ids, errors, consistency warnings
//! - `kvgraph-storage`: the [`KvStore`] trait and [`MemoryStore`]
//! - `kvgraph-engine`: [`Graph`] and its components
//!
//! ```
//! use std::sync::Arc;
//! use kvgraph::{Graph, MemoryStore};
//!
//! let graph = Graph::new(Arc::new(MemoryStore::new()));
//! let nyc = graph.add_node([("city", "NYC")]).unwrap();
//! graph.add_node([("city", "LA")]).unwrap();
//!
//! let hits = graph.find_nodes([("city", "^N")]).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id(), nyc.id());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use kvgraph_core::{
    ConsistencyWarning, Direction, EdgeId, EndpointRole, EntityKind, GraphError, NodeId,
    Properties, Relation, Result, StoreError,
};
pub use kvgraph_engine::{
    DeleteReport, Edge, EdgeSnapshot, Graph, GraphConfig, GraphSnapshot, IntegrityReport,
    Neighbor, Node, NodeSnapshot,
};
pub use kvgraph_storage::{KvStore, MemoryStore, StoreResult};
