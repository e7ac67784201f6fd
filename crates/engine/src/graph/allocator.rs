//! Identifier allocation.
//!
//! Node and edge ids come from two independent store counters. The counter
//! holds the number of ids handed out so far, so the first id of each kind
//! is 0. Allocation is a single atomic increment; ids are never reused.

use kvgraph_core::{EdgeId, EntityKind, GraphError, NodeId, Result};
use kvgraph_storage::KvStore;

use super::keys::Keyspace;

/// Issues monotonically increasing ids backed by store counters.
pub struct IdAllocator<'a, S: KvStore> {
    store: &'a S,
    keys: &'a Keyspace,
}

impl<'a, S: KvStore> IdAllocator<'a, S> {
    /// Allocator over the counters of `keys`.
    pub fn new(store: &'a S, keys: &'a Keyspace) -> Self {
        Self { store, keys }
    }

    /// Take the next id of `kind` and advance its counter.
    pub fn next(&self, kind: EntityKind) -> Result<u64> {
        let counter = self.keys.counter(kind);
        let issued = self.store.incr(&counter)?;
        u64::try_from(issued - 1)
            .map_err(|_| GraphError::corrupt(counter, format!("counter at {}", issued)))
    }

    /// Next node id.
    pub fn next_node(&self) -> Result<NodeId> {
        self.next(EntityKind::Node).map(NodeId::new)
    }

    /// Next edge id.
    pub fn next_edge(&self) -> Result<EdgeId> {
        self.next(EntityKind::Edge).map(EdgeId::new)
    }

    /// The id the next call to [`Self::next`] would return, without
    /// advancing the counter.
    pub fn peek(&self, kind: EntityKind) -> Result<u64> {
        let counter = self.keys.counter(kind);
        match self.store.get(&counter)? {
            None => Ok(0),
            Some(raw) => super::keys::parse_id(&counter, &raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvgraph_storage::MemoryStore;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counters_start_at_zero() {
        let store = MemoryStore::new();
        let keys = Keyspace::new("g").unwrap();
        let alloc = IdAllocator::new(&store, &keys);
        assert_eq!(alloc.peek(EntityKind::Node).unwrap(), 0);
        assert_eq!(alloc.next_node().unwrap(), NodeId::new(0));
        assert_eq!(alloc.next_node().unwrap(), NodeId::new(1));
        assert_eq!(alloc.peek(EntityKind::Node).unwrap(), 2);
    }

    #[test]
    fn node_and_edge_counters_are_independent() {
        let store = MemoryStore::new();
        let keys = Keyspace::new("g").unwrap();
        let alloc = IdAllocator::new(&store, &keys);
        alloc.next_node().unwrap();
        alloc.next_node().unwrap();
        assert_eq!(alloc.next_edge().unwrap(), EdgeId::new(0));
        assert_eq!(alloc.next_node().unwrap(), NodeId::new(2));
    }

    #[test]
    fn namespaces_do_not_share_counters() {
        let store = MemoryStore::new();
        let a = Keyspace::new("a").unwrap();
        let b = Keyspace::new("b").unwrap();
        IdAllocator::new(&store, &a).next_node().unwrap();
        assert_eq!(IdAllocator::new(&store, &b).next_node().unwrap(), NodeId::new(0));
    }

    #[test]
    fn corrupt_counter_propagates() {
        let store = MemoryStore::new();
        let keys = Keyspace::new("g").unwrap();
        store.set("g:next_nid", "lots").unwrap();
        let err = IdAllocator::new(&store, &keys).next_node().unwrap_err();
        assert!(matches!(err, GraphError::Store(_)));
    }

    #[test]
    fn concurrent_allocation_is_unique() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let keys = Keyspace::new("g").unwrap();
                    let alloc = IdAllocator::new(store.as_ref(), &keys);
                    (0..250)
                        .map(|_| alloc.next_edge().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<EdgeId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 1000);
        assert_eq!(ids.last().copied(), Some(EdgeId::new(999)));
    }
}
