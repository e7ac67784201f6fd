//! In-process store implementing every [`KvStore`] primitive.
//!
//! # Design
//!
//! - DashMap keyed by store key: sharded locking, concurrent readers
//! - FxHashSet / FxHashMap inside each entry: fast non-crypto hashing
//! - Each primitive holds the entry's shard lock for its whole duration,
//!   so `incr` and `zincrby` are atomic against concurrent callers
//!
//! Empty collections are dropped eagerly to honour the "absent, not empty"
//! contract of the trait.

use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use kvgraph_core::StoreError;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::{KvStore, StoreResult};

/// A typed value stored under one key.
#[derive(Debug, Clone)]
enum Entry {
    Scalar(String),
    Set(FxHashSet<String>),
    Sorted(FxHashMap<String, i64>),
    Hash(FxHashMap<String, String>),
}

impl Entry {
    fn type_name(&self) -> &'static str {
        match self {
            Entry::Scalar(_) => "string",
            Entry::Set(_) => "set",
            Entry::Sorted(_) => "zset",
            Entry::Hash(_) => "hash",
        }
    }

    fn is_empty_collection(&self) -> bool {
        match self {
            Entry::Scalar(_) => false,
            Entry::Set(s) => s.is_empty(),
            Entry::Sorted(z) => z.is_empty(),
            Entry::Hash(h) => h.is_empty(),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &Entry) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Concurrent in-memory key-value store.
///
/// # Example
///
/// ```
/// use kvgraph_storage::{KvStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.sadd("g:nodes", "0")?;
/// assert!(store.sismember("g:nodes", "0")?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    /// Number of mutating primitives applied so far
    writes: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            writes: AtomicU64::new(0),
        }
    }

    /// Create with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys, sorted. Intended for debugging and leftover-key checks.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of mutating primitives applied since creation.
    #[inline]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }

    /// Drop every key.
    pub fn flush(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.record_write();
        tracing::debug!(keys = dropped, "flushed memory store");
    }

    #[inline]
    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::AcqRel);
    }

    /// Remove `key` if it now holds an empty collection.
    fn drop_if_empty(&self, key: &str) {
        self.entries.remove_if(key, |_, e| e.is_empty_collection());
    }

    fn read(&self, key: &str) -> Option<Ref<'_, String, Entry>> {
        self.entries.get(key)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys", &self.len())
            .field("writes", &self.write_count())
            .finish()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.read(key) {
            None => Ok(None),
            Some(entry) => match entry.value() {
                Entry::Scalar(v) => Ok(Some(v.clone())),
                other => Err(wrong_type(key, "string", other)),
            },
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .insert(key.to_string(), Entry::Scalar(value.to_string()));
        self.record_write();
        Ok(())
    }

    fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Scalar("0".to_string()));
        let next = match entry.value_mut() {
            Entry::Scalar(v) => {
                let current: i64 = v.parse().map_err(|_| StoreError::NotAnInteger {
                    key: key.to_string(),
                })?;
                let next = current.checked_add(1).ok_or_else(|| StoreError::NotAnInteger {
                    key: key.to_string(),
                })?;
                *v = next.to_string();
                next
            }
            other => return Err(wrong_type(key, "string", other)),
        };
        drop(entry);
        self.record_write();
        Ok(next)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn del(&self, key: &str) -> StoreResult<bool> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.record_write();
        }
        Ok(removed)
    }

    fn sadd(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(FxHashSet::default()));
        let added = match entry.value_mut() {
            Entry::Set(s) => s.insert(member.to_string()),
            other => return Err(wrong_type(key, "set", other)),
        };
        drop(entry);
        self.record_write();
        Ok(added)
    }

    fn srem(&self, key: &str, member: &str) -> StoreResult<bool> {
        let removed = match self.entries.get_mut(key) {
            None => return Ok(false),
            Some(mut entry) => match entry.value_mut() {
                Entry::Set(s) => s.remove(member),
                other => return Err(wrong_type(key, "set", other)),
            },
        };
        if removed {
            self.drop_if_empty(key);
            self.record_write();
        }
        Ok(removed)
    }

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        match self.read(key) {
            None => Ok(false),
            Some(entry) => match entry.value() {
                Entry::Set(s) => Ok(s.contains(member)),
                other => Err(wrong_type(key, "set", other)),
            },
        }
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(entry) => match entry.value() {
                Entry::Set(s) => {
                    let mut members: Vec<String> = s.iter().cloned().collect();
                    members.sort();
                    Ok(members)
                }
                other => Err(wrong_type(key, "set", other)),
            },
        }
    }

    fn scard(&self, key: &str) -> StoreResult<usize> {
        match self.read(key) {
            None => Ok(0),
            Some(entry) => match entry.value() {
                Entry::Set(s) => Ok(s.len()),
                other => Err(wrong_type(key, "set", other)),
            },
        }
    }

    fn sinter(&self, keys: &[String]) -> StoreResult<Vec<String>> {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(Vec::new());
        };

        // Guards are taken one at a time; holding several read guards on one
        // shard while a writer queues on it would deadlock.
        let mut acc: FxHashSet<String> = match self.read(first) {
            None => return Ok(Vec::new()),
            Some(entry) => match entry.value() {
                Entry::Set(s) => s.clone(),
                other => return Err(wrong_type(first, "set", other)),
            },
        };
        for key in rest {
            if acc.is_empty() {
                break;
            }
            match self.read(key) {
                None => return Ok(Vec::new()),
                Some(entry) => match entry.value() {
                    Entry::Set(s) => acc.retain(|m| s.contains(m)),
                    other => return Err(wrong_type(key, "set", other)),
                },
            }
        }

        let mut members: Vec<String> = acc.into_iter().collect();
        members.sort();
        Ok(members)
    }

    fn zincrby(&self, key: &str, member: &str, delta: i64) -> StoreResult<i64> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Sorted(FxHashMap::default()));
        let score = match entry.value_mut() {
            Entry::Sorted(z) => {
                let score = z.entry(member.to_string()).or_insert(0);
                *score += delta;
                *score
            }
            other => return Err(wrong_type(key, "zset", other)),
        };
        drop(entry);
        self.record_write();
        Ok(score)
    }

    fn zrem(&self, key: &str, member: &str) -> StoreResult<bool> {
        let removed = match self.entries.get_mut(key) {
            None => return Ok(false),
            Some(mut entry) => match entry.value_mut() {
                Entry::Sorted(z) => z.remove(member).is_some(),
                other => return Err(wrong_type(key, "zset", other)),
            },
        };
        if removed {
            self.drop_if_empty(key);
            self.record_write();
        }
        Ok(removed)
    }

    fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<i64>> {
        match self.read(key) {
            None => Ok(None),
            Some(entry) => match entry.value() {
                Entry::Sorted(z) => Ok(z.get(member).copied()),
                other => Err(wrong_type(key, "zset", other)),
            },
        }
    }

    fn zrange(&self, key: &str) -> StoreResult<Vec<(String, i64)>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(entry) => match entry.value() {
                Entry::Sorted(z) => {
                    let mut members: Vec<(String, i64)> =
                        z.iter().map(|(m, s)| (m.clone(), *s)).collect();
                    members.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                    Ok(members)
                }
                other => Err(wrong_type(key, "zset", other)),
            },
        }
    }

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        match self.read(key) {
            None => Ok(None),
            Some(entry) => match entry.value() {
                Entry::Hash(h) => Ok(h.get(field).cloned()),
                other => Err(wrong_type(key, "hash", other)),
            },
        }
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(FxHashMap::default()));
        let is_new = match entry.value_mut() {
            Entry::Hash(h) => h.insert(field.to_string(), value.to_string()).is_none(),
            other => return Err(wrong_type(key, "hash", other)),
        };
        drop(entry);
        self.record_write();
        Ok(is_new)
    }

    fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        let removed = match self.entries.get_mut(key) {
            None => return Ok(false),
            Some(mut entry) => match entry.value_mut() {
                Entry::Hash(h) => h.remove(field).is_some(),
                other => return Err(wrong_type(key, "hash", other)),
            },
        };
        if removed {
            self.drop_if_empty(key);
            self.record_write();
        }
        Ok(removed)
    }

    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(entry) => match entry.value() {
                Entry::Hash(h) => {
                    let mut fields: Vec<(String, String)> =
                        h.iter().map(|(f, v)| (f.clone(), v.clone())).collect();
                    fields.sort();
                    Ok(fields)
                }
                other => Err(wrong_type(key, "hash", other)),
            },
        }
    }
}
