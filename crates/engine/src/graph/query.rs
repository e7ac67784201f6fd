//! Exact and regex queries over the property index.
//!
//! Exact queries are a single intersection of value sets. Regex queries
//! start from the presence set of each filtered key and test the live
//! property value of every candidate; the per-filter matches are then
//! intersected. Patterns are unanchored (search semantics).

use std::collections::BTreeSet;

use regex::Regex;
use tracing::trace;

use kvgraph_core::{EntityKind, GraphError, Result};
use kvgraph_storage::KvStore;

use super::entity::EntityStore;
use super::index::PropertyIndex;
use super::keys::{validate_property_key, Keyspace};

/// Query view over one graph's keyspace.
pub struct QueryEngine<'a, S: KvStore> {
    index: PropertyIndex<'a, S>,
    entities: EntityStore<'a, S>,
}

impl<'a, S: KvStore> QueryEngine<'a, S> {
    /// Query view over `keys`.
    pub fn new(store: &'a S, keys: &'a Keyspace) -> Self {
        Self {
            index: PropertyIndex::new(store, keys),
            entities: EntityStore::new(store, keys),
        }
    }

    /// Ids of `kind` whose properties equal every filter, ascending.
    pub fn get(&self, kind: EntityKind, filters: &[(String, String)]) -> Result<Vec<u64>> {
        for (key, _) in filters {
            validate_property_key(key)?;
        }
        let ids = self.index.lookup_exact(kind, filters)?;
        trace!(kind = %kind, filters = filters.len(), matched = ids.len(), "Exact lookup");
        Ok(ids)
    }

    /// Ids of `kind` whose properties match every regex filter, ascending.
    pub fn find(&self, kind: EntityKind, filters: &[(String, String)]) -> Result<Vec<u64>> {
        if filters.is_empty() {
            return Err(GraphError::invalid_query(format!(
                "regex search of {}s needs at least one filter",
                kind
            )));
        }
        let compiled = compile(filters)?;

        let mut matched: Option<BTreeSet<u64>> = None;
        for (key, pattern) in &compiled {
            let candidates = self.index.candidates_with_key(kind, key)?;
            trace!(kind = %kind, key = %key, candidates = candidates.len(), "Regex scan");

            let mut hits = BTreeSet::new();
            for id in candidates {
                if let Some(current) = &matched {
                    if !current.contains(&id) {
                        continue;
                    }
                }
                let Some(value) = self.entities.get_property(kind, id, key)? else {
                    continue;
                };
                if pattern.is_match(&value) {
                    hits.insert(id);
                }
            }

            if hits.is_empty() {
                return Ok(Vec::new());
            }
            matched = Some(hits);
        }

        Ok(matched.map(|ids| ids.into_iter().collect()).unwrap_or_default())
    }
}

/// Validate keys and compile every pattern before touching the store.
fn compile(filters: &[(String, String)]) -> Result<Vec<(&str, Regex)>> {
    filters
        .iter()
        .map(|(key, pattern)| {
            validate_property_key(key)?;
            let regex = Regex::new(pattern).map_err(|source| GraphError::InvalidPattern {
                key: key.clone(),
                source,
            })?;
            Ok((key.as_str(), regex))
        })
        .collect()
}
