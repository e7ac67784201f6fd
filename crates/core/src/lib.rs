//! Core types for kvgraph.
//!
//! Shared by the storage and engine crates:
//! - [`NodeId`] / [`EdgeId`]: integer identifiers in independent ID spaces
//! - [`EntityKind`]: node or edge, selecting key prefixes and index families
//! - [`Properties`]: the flat string → string property map
//! - [`GraphError`] / [`StoreError`]: fatal errors
//! - [`ConsistencyWarning`]: non-fatal structural drift reports

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod warning;

pub use error::{GraphError, Result, StoreError};
pub use types::{Direction, EdgeId, EndpointRole, EntityKind, NodeId, Properties, Relation};
pub use warning::ConsistencyWarning;
