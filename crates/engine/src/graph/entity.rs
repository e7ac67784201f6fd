//! Entity storage: membership, property maps and edge endpoint links.
//!
//! A node or edge exists iff its id is in the kind's membership set. Its
//! properties live in one field map; an edge additionally keeps its source
//! and target node ids as two scalars. Nothing here touches the derived
//! index or adjacency structures.

use kvgraph_core::{EdgeId, EntityKind, GraphError, NodeId, Properties, Result};
use kvgraph_storage::KvStore;

use super::keys::{parse_id, Keyspace};

/// Store-backed view of entity data.
pub struct EntityStore<'a, S: KvStore> {
    store: &'a S,
    keys: &'a Keyspace,
}

impl<'a, S: KvStore> EntityStore<'a, S> {
    /// Entity view over `keys`.
    pub fn new(store: &'a S, keys: &'a Keyspace) -> Self {
        Self { store, keys }
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Register an entity.
    pub fn create(&self, kind: EntityKind, id: u64) -> Result<()> {
        self.store.sadd(&self.keys.members(kind), &id.to_string())?;
        Ok(())
    }

    /// Whether the entity is registered.
    pub fn exists(&self, kind: EntityKind, id: u64) -> Result<bool> {
        Ok(self
            .store
            .sismember(&self.keys.members(kind), &id.to_string())?)
    }

    /// All registered ids of a kind, ascending.
    pub fn members(&self, kind: EntityKind) -> Result<Vec<u64>> {
        let key = self.keys.members(kind);
        let mut ids = self
            .store
            .smembers(&key)?
            .iter()
            .map(|m| parse_id(&key, m))
            .collect::<Result<Vec<u64>>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    /// Number of registered entities of a kind.
    pub fn count(&self, kind: EntityKind) -> Result<usize> {
        Ok(self.store.scard(&self.keys.members(kind))?)
    }

    /// Unregister an entity and drop its property map (and links, for edges).
    pub fn destroy(&self, kind: EntityKind, id: u64) -> Result<()> {
        self.store.del(&self.keys.properties(kind, id))?;
        if kind == EntityKind::Edge {
            let edge = EdgeId::new(id);
            self.store.del(&self.keys.source_link(edge))?;
            self.store.del(&self.keys.target_link(edge))?;
        }
        self.store.srem(&self.keys.members(kind), &id.to_string())?;
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Store `value` under `key`, returning the value it replaced.
    pub fn set_property(
        &self,
        kind: EntityKind,
        id: u64,
        key: &str,
        value: &str,
    ) -> Result<Option<String>> {
        let map = self.keys.properties(kind, id);
        let prior = self.store.hget(&map, key)?;
        self.store.hset(&map, key, value)?;
        Ok(prior)
    }

    /// Read one property.
    pub fn get_property(&self, kind: EntityKind, id: u64, key: &str) -> Result<Option<String>> {
        Ok(self.store.hget(&self.keys.properties(kind, id), key)?)
    }

    /// Remove one property, returning the value it held.
    pub fn delete_property(&self, kind: EntityKind, id: u64, key: &str) -> Result<String> {
        let map = self.keys.properties(kind, id);
        let prior = self
            .store
            .hget(&map, key)?
            .ok_or_else(|| GraphError::NotFound {
                kind,
                id,
                key: key.to_string(),
            })?;
        self.store.hdel(&map, key)?;
        Ok(prior)
    }

    /// Every property currently set.
    pub fn all_properties(&self, kind: EntityKind, id: u64) -> Result<Properties> {
        Ok(self
            .store
            .hgetall(&self.keys.properties(kind, id))?
            .into_iter()
            .collect())
    }

    // =========================================================================
    // Edge links
    // =========================================================================

    /// Record an edge's endpoints.
    pub fn set_links(&self, edge: EdgeId, source: NodeId, target: NodeId) -> Result<()> {
        self.store
            .set(&self.keys.source_link(edge), &source.to_string())?;
        self.store
            .set(&self.keys.target_link(edge), &target.to_string())?;
        Ok(())
    }

    /// An edge's recorded (source, target); either may be missing.
    pub fn links(&self, edge: EdgeId) -> Result<(Option<NodeId>, Option<NodeId>)> {
        let source = self.read_link(&self.keys.source_link(edge))?;
        let target = self.read_link(&self.keys.target_link(edge))?;
        Ok((source, target))
    }

    fn read_link(&self, key: &str) -> Result<Option<NodeId>> {
        self.store
            .get(key)?
            .map(|raw| parse_id(key, &raw))
            .transpose()
    }
}
