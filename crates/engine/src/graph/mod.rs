//! Property graph over key-value store primitives.
//!
//! A [`Graph`] owns nothing but a shared store handle and its keyspace.
//! Entity data, adjacency and the property index all live in the store:
//!
//! - [`allocator`]: id counters
//! - [`entity`]: membership, property maps, edge endpoint links
//! - [`adjacency`]: per-node edge sets and weighted neighbor counts
//! - [`index`]: presence and value sets per property key
//! - [`query`]: exact and regex lookups
//!
//! The facade drives these in a fixed order so that derived data follows
//! entity data: index after set, deindex before overwrite, deindex before
//! destroy, and incident edges before the node they touch. Each step is an
//! atomic store primitive but a whole operation is not a transaction.

pub mod adjacency;
pub mod allocator;
pub mod entity;
pub mod index;
pub mod integrity;
pub mod keys;
pub mod query;
mod snapshot;
pub mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use kvgraph_core::{
    ConsistencyWarning, EdgeId, EndpointRole, EntityKind, GraphError, NodeId, Properties, Result,
};
use kvgraph_storage::KvStore;

use crate::config::GraphConfig;
use adjacency::AdjacencyIndex;
use allocator::IdAllocator;
use entity::EntityStore;
use index::PropertyIndex;
use keys::{validate_property_key, Keyspace};
use query::QueryEngine;
use types::{DeleteReport, Edge, Node};

pub use integrity::IntegrityReport;
pub use snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot};

/// A property graph stored in a [`KvStore`].
///
/// Cloning is cheap and clones share the store. Several graphs with
/// different namespaces can live in one store.
pub struct Graph<S: KvStore> {
    store: Arc<S>,
    keys: Keyspace,
}

impl<S: KvStore> Clone for Graph<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keys: self.keys.clone(),
        }
    }
}

impl<S: KvStore> std::fmt::Debug for Graph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("namespace", &self.keys.namespace())
            .finish()
    }
}

impl<S: KvStore> Graph<S> {
    /// Graph under the default namespace.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            keys: Keyspace::default(),
        }
    }

    /// Graph described by `config`.
    pub fn open(store: Arc<S>, config: GraphConfig) -> Result<Self> {
        config.validate()?;
        let keys = Keyspace::new(config.namespace)?;
        debug!(namespace = %keys.namespace(), "Graph opened");
        Ok(Self { store, keys })
    }

    /// Namespace every key of this graph is prefixed with.
    pub fn namespace(&self) -> &str {
        self.keys.namespace()
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // =========================================================================
    // Components
    // =========================================================================

    pub(crate) fn alloc(&self) -> IdAllocator<'_, S> {
        IdAllocator::new(&self.store, &self.keys)
    }

    pub(crate) fn entities(&self) -> EntityStore<'_, S> {
        EntityStore::new(&self.store, &self.keys)
    }

    pub(crate) fn adjacency(&self) -> AdjacencyIndex<'_, S> {
        AdjacencyIndex::new(&self.store, &self.keys)
    }

    pub(crate) fn index(&self) -> PropertyIndex<'_, S> {
        PropertyIndex::new(&self.store, &self.keys)
    }

    fn query(&self) -> QueryEngine<'_, S> {
        QueryEngine::new(&self.store, &self.keys)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a node with the given properties.
    pub fn add_node<I, K, V>(&self, properties: I) -> Result<Node<'_, S>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let properties = collect_properties(properties)?;
        let id = self.alloc().next_node()?;
        self.entities().create(EntityKind::Node, id.as_u64())?;
        self.write_properties(EntityKind::Node, id.as_u64(), &properties)?;
        debug!(namespace = %self.namespace(), node = %id, properties = properties.len(), "Node created");
        Ok(Node::new(self, id))
    }

    /// Create an edge from `source` to `target`. Both must exist.
    pub fn add_edge<I, K, V>(
        &self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        properties: I,
    ) -> Result<Edge<'_, S>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = source.into();
        let target = target.into();
        let properties = collect_properties(properties)?;
        for endpoint in [source, target] {
            if !self.has_node(endpoint)? {
                return Err(GraphError::UnknownEndpoint { id: endpoint });
            }
        }

        let id = self.alloc().next_edge()?;
        let entities = self.entities();
        entities.create(EntityKind::Edge, id.as_u64())?;
        entities.set_links(id, source, target)?;
        self.write_properties(EntityKind::Edge, id.as_u64(), &properties)?;
        self.adjacency().link(source, target, id)?;
        debug!(
            namespace = %self.namespace(),
            edge = %id,
            source = %source,
            target = %target,
            "Edge created"
        );
        Ok(Edge::new(self, id))
    }

    fn write_properties(&self, kind: EntityKind, id: u64, properties: &Properties) -> Result<()> {
        let entities = self.entities();
        let index = self.index();
        for (key, value) in properties {
            entities.set_property(kind, id, key, value)?;
            index.index(kind, id, key, value)?;
        }
        Ok(())
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete a node and every edge touching it.
    pub fn del_node(&self, node: impl Into<NodeId>) -> Result<DeleteReport> {
        let node = node.into();
        self.ensure_node(node)?;
        let report = self.remove_node(node)?;
        debug!(
            namespace = %self.namespace(),
            node = %node,
            removed_edges = report.removed_edges.len(),
            "Node deleted"
        );
        self.log_warnings("del_node", &report.warnings);
        Ok(report)
    }

    /// Delete an edge.
    pub fn del_edge(&self, edge: impl Into<EdgeId>) -> Result<DeleteReport> {
        let edge = edge.into();
        self.ensure_edge(edge)?;
        let mut report = DeleteReport::default();
        self.remove_edge(edge, &mut report.warnings)?;
        report.removed_edges.push(edge);
        debug!(namespace = %self.namespace(), edge = %edge, "Edge deleted");
        self.log_warnings("del_edge", &report.warnings);
        Ok(report)
    }

    /// Delete every node and edge. Counters are kept, so ids are still
    /// never reused.
    pub fn clear(&self) -> Result<DeleteReport> {
        let mut report = DeleteReport::default();
        for id in self.entities().members(EntityKind::Node)? {
            report.merge(self.remove_node(NodeId::new(id))?);
        }
        // Edges that no node's adjacency reached
        for id in self.entities().members(EntityKind::Edge)? {
            let edge = EdgeId::new(id);
            self.remove_edge(edge, &mut report.warnings)?;
            report.removed_edges.push(edge);
        }
        debug!(
            namespace = %self.namespace(),
            removed_edges = report.removed_edges.len(),
            "Graph cleared"
        );
        self.log_warnings("clear", &report.warnings);
        Ok(report)
    }

    fn remove_node(&self, node: NodeId) -> Result<DeleteReport> {
        let mut report = DeleteReport::default();
        let entities = self.entities();
        let adjacency = self.adjacency();

        for edge in adjacency.incident_edges(node)? {
            if entities.exists(EntityKind::Edge, edge.as_u64())? {
                self.remove_edge(edge, &mut report.warnings)?;
                report.removed_edges.push(edge);
            } else {
                report
                    .warnings
                    .push(ConsistencyWarning::DanglingEdge { node, edge });
                adjacency.forget_edge(node, edge)?;
            }
        }

        self.deindex_all(EntityKind::Node, node.as_u64())?;
        report.warnings.extend(adjacency.clear(node)?);
        entities.destroy(EntityKind::Node, node.as_u64())?;
        Ok(report)
    }

    /// Remove one edge, recording drift instead of failing on it.
    fn remove_edge(&self, edge: EdgeId, warnings: &mut Vec<ConsistencyWarning>) -> Result<()> {
        let entities = self.entities();
        let adjacency = self.adjacency();

        let (source, target) = entities.links(edge)?;
        let live_source = self.live_endpoint(edge, EndpointRole::Source, source, warnings)?;
        let live_target = self.live_endpoint(edge, EndpointRole::Target, target, warnings)?;

        match (live_source, live_target) {
            (Some(source), Some(target)) => {
                warnings.extend(adjacency.unlink(source, target, edge)?);
            }
            (live_source, live_target) => {
                if let Some(source) = live_source {
                    warnings.extend(adjacency.unlink_outgoing(source, edge, target)?);
                }
                if let Some(target) = live_target {
                    warnings.extend(adjacency.unlink_incoming(target, edge, source)?);
                }
            }
        }

        self.deindex_all(EntityKind::Edge, edge.as_u64())?;
        entities.destroy(EntityKind::Edge, edge.as_u64())?;
        Ok(())
    }

    fn live_endpoint(
        &self,
        edge: EdgeId,
        role: EndpointRole,
        link: Option<NodeId>,
        warnings: &mut Vec<ConsistencyWarning>,
    ) -> Result<Option<NodeId>> {
        let Some(node) = link else {
            warnings.push(ConsistencyWarning::MissingLink { edge, role });
            return Ok(None);
        };
        if !self.has_node(node)? {
            warnings.push(ConsistencyWarning::MissingEndpoint { edge, role, node });
            return Ok(None);
        }
        Ok(Some(node))
    }

    fn deindex_all(&self, kind: EntityKind, id: u64) -> Result<()> {
        let index = self.index();
        for (key, value) in self.entities().all_properties(kind, id)? {
            index.deindex(kind, id, &key, &value, false)?;
        }
        Ok(())
    }

    fn log_warnings(&self, op: &str, warnings: &[ConsistencyWarning]) {
        for warning in warnings {
            warn!(
                namespace = %self.namespace(),
                op = op,
                warning = %warning,
                "Graph consistency warning"
            );
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Set `key = value` on an entity, returning the value it replaced.
    pub fn set_property(
        &self,
        kind: EntityKind,
        id: u64,
        key: &str,
        value: &str,
    ) -> Result<Option<String>> {
        validate_property_key(key)?;
        self.ensure_exists(kind, id)?;
        let index = self.index();
        let prior = self.entities().set_property(kind, id, key, value)?;
        match prior.as_deref() {
            Some(old) if old == value => {}
            Some(old) => {
                index.deindex(kind, id, key, old, true)?;
                index.index(kind, id, key, value)?;
            }
            None => index.index(kind, id, key, value)?,
        }
        debug!(namespace = %self.namespace(), kind = %kind, id, key, "Property set");
        Ok(prior)
    }

    /// Read one property of an entity.
    pub fn get_property(&self, kind: EntityKind, id: u64, key: &str) -> Result<Option<String>> {
        self.ensure_exists(kind, id)?;
        self.entities().get_property(kind, id, key)
    }

    /// Remove a property, returning the value it held.
    pub fn del_property(&self, kind: EntityKind, id: u64, key: &str) -> Result<String> {
        self.ensure_exists(kind, id)?;
        let value = self.entities().delete_property(kind, id, key)?;
        self.index().deindex(kind, id, key, &value, false)?;
        debug!(namespace = %self.namespace(), kind = %kind, id, key, "Property deleted");
        Ok(value)
    }

    /// All properties of an entity.
    pub fn properties(&self, kind: EntityKind, id: u64) -> Result<Properties> {
        self.ensure_exists(kind, id)?;
        self.entities().all_properties(kind, id)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Handle to an existing node.
    pub fn node(&self, id: impl Into<NodeId>) -> Result<Node<'_, S>> {
        let id = id.into();
        self.ensure_node(id)?;
        Ok(Node::new(self, id))
    }

    /// Handle to an existing edge.
    pub fn edge(&self, id: impl Into<EdgeId>) -> Result<Edge<'_, S>> {
        let id = id.into();
        self.ensure_edge(id)?;
        Ok(Edge::new(self, id))
    }

    /// Whether a node exists.
    pub fn has_node(&self, id: impl Into<NodeId>) -> Result<bool> {
        self.entities()
            .exists(EntityKind::Node, id.into().as_u64())
    }

    /// Whether an edge exists.
    pub fn has_edge(&self, id: impl Into<EdgeId>) -> Result<bool> {
        self.entities()
            .exists(EntityKind::Edge, id.into().as_u64())
    }

    /// Every node, ordered by id.
    pub fn list_nodes(&self) -> Result<Vec<Node<'_, S>>> {
        Ok(self.node_handles(self.entities().members(EntityKind::Node)?))
    }

    /// Every edge, ordered by id.
    pub fn list_edges(&self) -> Result<Vec<Edge<'_, S>>> {
        Ok(self.edge_handles(self.entities().members(EntityKind::Edge)?))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> Result<usize> {
        self.entities().count(EntityKind::Node)
    }

    /// Number of edges.
    pub fn edge_count(&self) -> Result<usize> {
        self.entities().count(EntityKind::Edge)
    }

    /// Recorded (source, target) of an edge.
    pub fn endpoints(&self, edge: EdgeId) -> Result<(NodeId, NodeId)> {
        self.ensure_edge(edge)?;
        match self.entities().links(edge)? {
            (Some(source), Some(target)) => Ok((source, target)),
            (None, _) => Err(GraphError::corrupt(
                self.keys.source_link(edge),
                "edge has no source link",
            )),
            (_, None) => Err(GraphError::corrupt(
                self.keys.target_link(edge),
                "edge has no target link",
            )),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Nodes whose properties equal every `(key, value)` filter.
    pub fn get_nodes<I, K, V>(&self, filters: I) -> Result<Vec<Node<'_, S>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ids = self
            .query()
            .get(EntityKind::Node, &collect_filters(filters))?;
        Ok(self.node_handles(ids))
    }

    /// Edges whose properties equal every `(key, value)` filter.
    pub fn get_edges<I, K, V>(&self, filters: I) -> Result<Vec<Edge<'_, S>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ids = self
            .query()
            .get(EntityKind::Edge, &collect_filters(filters))?;
        Ok(self.edge_handles(ids))
    }

    /// Nodes whose properties match every `(key, pattern)` regex filter.
    pub fn find_nodes<I, K, V>(&self, filters: I) -> Result<Vec<Node<'_, S>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ids = self
            .query()
            .find(EntityKind::Node, &collect_filters(filters))?;
        Ok(self.node_handles(ids))
    }

    /// Edges whose properties match every `(key, pattern)` regex filter.
    pub fn find_edges<I, K, V>(&self, filters: I) -> Result<Vec<Edge<'_, S>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ids = self
            .query()
            .find(EntityKind::Edge, &collect_filters(filters))?;
        Ok(self.edge_handles(ids))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    pub(crate) fn ensure_node(&self, id: NodeId) -> Result<()> {
        self.ensure_exists(EntityKind::Node, id.as_u64())
    }

    pub(crate) fn ensure_edge(&self, id: EdgeId) -> Result<()> {
        self.ensure_exists(EntityKind::Edge, id.as_u64())
    }

    fn ensure_exists(&self, kind: EntityKind, id: u64) -> Result<()> {
        if self.entities().exists(kind, id)? {
            return Ok(());
        }
        Err(match kind {
            EntityKind::Node => GraphError::unknown_node(id),
            EntityKind::Edge => GraphError::unknown_edge(id),
        })
    }

    fn node_handles(&self, ids: Vec<u64>) -> Vec<Node<'_, S>> {
        ids.into_iter()
            .map(|id| Node::new(self, NodeId::new(id)))
            .collect()
    }

    fn edge_handles(&self, ids: Vec<u64>) -> Vec<Edge<'_, S>> {
        ids.into_iter()
            .map(|id| Edge::new(self, EdgeId::new(id)))
            .collect()
    }
}

/// Collect and validate a property map. Later duplicates win.
fn collect_properties<I, K, V>(properties: I) -> Result<Properties>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let properties: BTreeMap<String, String> = properties
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    for key in properties.keys() {
        validate_property_key(key)?;
    }
    Ok(properties)
}

fn collect_filters<I, K, V>(filters: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    filters
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
