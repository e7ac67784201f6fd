//! Graph Comprehensive Test Suite
//!
//! Exercises the public `kvgraph` API end to end.
//!
//! ## Test Tiers
//!
//! - **Tier 1**: Store primitive contract (`MemoryStore`)
//! - **Tier 2**: Entity and property behavior
//! - **Tier 3**: Adjacency and cascading deletion
//! - **Tier 4**: Drift handling, audit and snapshot
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test graph_comprehensive
//! ```

// Test modules
mod test_utils;

// Tier 1: Store Contract
mod tier1_store_contract;

// Tier 2: Entities and Properties
mod tier2_properties;

// Tier 3: Adjacency and Cascade
mod tier3_cascade;

// Tier 4: Drift, Audit, Snapshot
mod tier4_drift_and_audit;
