//! Secondary property index.
//!
//! Two families of sets per entity kind:
//! - presence `{ns}:i:{t}:{key}`: ids that currently have `key` set
//! - value `{ns}:i:{t}:{key}:{value}`: ids whose `key` equals `value`
//!
//! Empty sets are deleted, never left behind as empty buckets. The index
//! does not read entity data; callers keep it in step with the entity
//! store (deindex before reindex on overwrite, deindex before destroy).

use kvgraph_core::{EntityKind, GraphError, Result};
use kvgraph_storage::KvStore;

use super::keys::{parse_id, Keyspace};

/// Property index view over one graph's keyspace.
pub struct PropertyIndex<'a, S: KvStore> {
    store: &'a S,
    keys: &'a Keyspace,
}

impl<'a, S: KvStore> PropertyIndex<'a, S> {
    /// Index view over `keys`.
    pub fn new(store: &'a S, keys: &'a Keyspace) -> Self {
        Self { store, keys }
    }

    /// Record that `id` holds `key = value`.
    pub fn index(&self, kind: EntityKind, id: u64, key: &str, value: &str) -> Result<()> {
        let member = id.to_string();
        self.store.sadd(&self.keys.presence(kind, key), &member)?;
        self.store
            .sadd(&self.keys.value_set(kind, key, value), &member)?;
        Ok(())
    }

    /// Forget that `id` holds `key = value`.
    ///
    /// The presence entry is kept when `retain_presence` is set, which is
    /// the case while an overwrite replaces the value.
    pub fn deindex(
        &self,
        kind: EntityKind,
        id: u64,
        key: &str,
        value: &str,
        retain_presence: bool,
    ) -> Result<()> {
        let member = id.to_string();
        self.remove_member(&self.keys.value_set(kind, key, value), &member)?;
        if !retain_presence {
            self.remove_member(&self.keys.presence(kind, key), &member)?;
        }
        Ok(())
    }

    /// Ids matching every `(key, value)` filter, ascending.
    pub fn lookup_exact(&self, kind: EntityKind, filters: &[(String, String)]) -> Result<Vec<u64>> {
        if filters.is_empty() {
            return Err(GraphError::invalid_query(format!(
                "exact lookup of {}s needs at least one filter",
                kind
            )));
        }
        let buckets: Vec<String> = filters
            .iter()
            .map(|(key, value)| self.keys.value_set(kind, key, value))
            .collect();
        let ids = self.store.sinter(&buckets)?;
        self.decode(&self.keys.members(kind), ids)
    }

    /// Ids that have `key` set, ascending.
    pub fn candidates_with_key(&self, kind: EntityKind, key: &str) -> Result<Vec<u64>> {
        let presence = self.keys.presence(kind, key);
        let ids = self.store.smembers(&presence)?;
        self.decode(&presence, ids)
    }

    /// Ids indexed under `key = value`, ascending.
    pub fn value_members(&self, kind: EntityKind, key: &str, value: &str) -> Result<Vec<u64>> {
        let bucket = self.keys.value_set(kind, key, value);
        let ids = self.store.smembers(&bucket)?;
        self.decode(&bucket, ids)
    }

    fn remove_member(&self, key: &str, member: &str) -> Result<()> {
        self.store.srem(key, member)?;
        // The store drops emptied sets itself; this covers stores that keep them.
        if self.store.scard(key)? == 0 {
            self.store.del(key)?;
        }
        Ok(())
    }

    fn decode(&self, key: &str, raw: Vec<String>) -> Result<Vec<u64>> {
        let mut ids = raw
            .iter()
            .map(|m| parse_id(key, m))
            .collect::<Result<Vec<u64>>>()?;
        ids.sort_unstable();
        Ok(ids)
    }
}
