//! Shared helpers for the comprehensive suite.

use std::sync::Arc;

use kvgraph::{Graph, MemoryStore, NodeId, Properties};

/// Fresh store plus a graph under the default namespace.
pub fn setup() -> (Arc<MemoryStore>, Graph<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let graph = Graph::new(Arc::clone(&store));
    (store, graph)
}

/// Empty property map.
pub fn no_props() -> Properties {
    Properties::new()
}

/// Ids of a list of handles.
pub fn ids<T: Copy + Into<NodeId>>(nodes: &[T]) -> Vec<NodeId> {
    nodes.iter().map(|&n| n.into()).collect()
}

/// Store keys other than the id counters.
pub fn data_keys(store: &MemoryStore, namespace: &str) -> Vec<String> {
    let counters = [
        format!("{}:next_nid", namespace),
        format!("{}:next_eid", namespace),
    ];
    store
        .keys()
        .into_iter()
        .filter(|k| !counters.contains(k))
        .collect()
}
