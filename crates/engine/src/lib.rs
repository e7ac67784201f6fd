//! Graph engine for kvgraph
//!
//! A property graph (nodes, directed edges, string properties) kept entirely
//! in key-value store primitives:
//! - [`Graph`]: the facade; creation, cascading deletion, properties, queries
//! - [`GraphConfig`]: namespace and other open-time options
//! - [`graph::keys`]: the key layout shared by every component
//! - [`IntegrityReport`] / [`GraphSnapshot`]: audit and dump of a stored graph
//!
//! ```
//! use std::sync::Arc;
//! use kvgraph_engine::Graph;
//! use kvgraph_storage::MemoryStore;
//!
//! let graph = Graph::new(Arc::new(MemoryStore::new()));
//! let alice = graph.add_node([("name", "alice")]).unwrap();
//! let bob = graph.add_node([("name", "bob")]).unwrap();
//! graph.add_edge(&alice, &bob, [("rel", "knows")]).unwrap();
//!
//! assert_eq!(graph.get_edges([("rel", "knows")]).unwrap().len(), 1);
//! assert_eq!(alice.children().unwrap()[0].node, bob.id());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;

pub use config::GraphConfig;
pub use graph::types::{DeleteReport, Edge, Neighbor, Node};
pub use graph::{EdgeSnapshot, Graph, GraphSnapshot, IntegrityReport, NodeSnapshot};
