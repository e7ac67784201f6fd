//! Storage layer for kvgraph
//!
//! This crate defines the primitive contract the graph is built on and ships
//! an in-process implementation of it:
//! - [`KvStore`]: scalars, sets, weighted sets and field maps
//! - [`MemoryStore`]: DashMap-backed store, safe to share across threads
//!
//! Other backends (for example a networked store) implement [`KvStore`] in
//! their own crates; the graph layer only ever talks to the trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{KvStore, StoreResult};
