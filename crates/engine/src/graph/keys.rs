//! Key construction and validation for graph storage.
//!
//! Every graph lives under one namespace. Key format uses `:` as the
//! separator between path segments:
//!
//! | Key | Holds |
//! |-----|-------|
//! | `{ns}:nodes`, `{ns}:edges` | membership sets |
//! | `{ns}:next_nid`, `{ns}:next_eid` | id counters |
//! | `{ns}:{n\|e}:{id}:p` | property map |
//! | `{ns}:n:{id}:ie` / `:oe` | incoming / outgoing edge sets |
//! | `{ns}:n:{id}:pn` / `:cn` | parent / child weighted sets |
//! | `{ns}:e:{id}:in` / `:on` | source / target node scalars |
//! | `{ns}:i:{n\|e}:{key}` | presence index |
//! | `{ns}:i:{n\|e}:{key}:{value}` | value index |
//!
//! Namespaces and property keys may not contain the separator, which keeps
//! the value segment of a value-index key unambiguous.

use kvgraph_core::{EdgeId, EntityKind, GraphError, NodeId, Result};
use std::str::FromStr;

/// Separator used between path segments in graph keys.
const SEP: char = ':';

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "rgr";

// =============================================================================
// Validation
// =============================================================================

/// Validate a graph namespace.
pub fn validate_namespace(ns: &str) -> Result<()> {
    if ns.is_empty() {
        return Err(GraphError::invalid_input("Graph namespace must not be empty"));
    }
    if ns.contains(SEP) {
        return Err(GraphError::invalid_input(
            "Graph namespace must not contain ':'",
        ));
    }
    Ok(())
}

/// Validate a property key.
pub fn validate_property_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(GraphError::invalid_input("Property key must not be empty"));
    }
    if key.contains(SEP) {
        return Err(GraphError::invalid_input(format!(
            "Property key '{}' must not contain ':'",
            key
        )));
    }
    Ok(())
}

/// Decode a set member or scalar that should hold an id.
pub fn parse_id<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| GraphError::corrupt(key, format!("'{}' is not an id", raw)))
}

// =============================================================================
// Key Construction
// =============================================================================

/// Builds every store key used by one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    ns: String,
}

impl Keyspace {
    /// Keyspace for a validated namespace.
    pub fn new(ns: impl Into<String>) -> Result<Self> {
        let ns = ns.into();
        validate_namespace(&ns)?;
        Ok(Self { ns })
    }

    /// The namespace all keys are prefixed with.
    pub fn namespace(&self) -> &str {
        &self.ns
    }

    // --- Graph-wide keys ---

    /// Membership set of a kind: `{ns}:nodes` / `{ns}:edges`
    pub fn members(&self, kind: EntityKind) -> String {
        match kind {
            EntityKind::Node => format!("{}{SEP}nodes", self.ns),
            EntityKind::Edge => format!("{}{SEP}edges", self.ns),
        }
    }

    /// Id counter of a kind: `{ns}:next_nid` / `{ns}:next_eid`
    pub fn counter(&self, kind: EntityKind) -> String {
        match kind {
            EntityKind::Node => format!("{}{SEP}next_nid", self.ns),
            EntityKind::Edge => format!("{}{SEP}next_eid", self.ns),
        }
    }

    // --- Entity keys ---

    /// Entity root: `{ns}:{n|e}:{id}`
    pub fn entity_root(&self, kind: EntityKind, id: u64) -> String {
        format!("{}{SEP}{}{SEP}{}", self.ns, kind.tag(), id)
    }

    /// Property map: `{ns}:{n|e}:{id}:p`
    pub fn properties(&self, kind: EntityKind, id: u64) -> String {
        format!("{}{SEP}p", self.entity_root(kind, id))
    }

    /// Incoming edge set: `{ns}:n:{id}:ie`
    pub fn in_edges(&self, node: NodeId) -> String {
        self.node_suffix(node, "ie")
    }

    /// Outgoing edge set: `{ns}:n:{id}:oe`
    pub fn out_edges(&self, node: NodeId) -> String {
        self.node_suffix(node, "oe")
    }

    /// Parent weighted set: `{ns}:n:{id}:pn`
    pub fn parents(&self, node: NodeId) -> String {
        self.node_suffix(node, "pn")
    }

    /// Child weighted set: `{ns}:n:{id}:cn`
    pub fn children(&self, node: NodeId) -> String {
        self.node_suffix(node, "cn")
    }

    /// Source node scalar: `{ns}:e:{id}:in`
    pub fn source_link(&self, edge: EdgeId) -> String {
        self.edge_suffix(edge, "in")
    }

    /// Target node scalar: `{ns}:e:{id}:on`
    pub fn target_link(&self, edge: EdgeId) -> String {
        self.edge_suffix(edge, "on")
    }

    /// All four adjacency keys of a node.
    pub fn adjacency_keys(&self, node: NodeId) -> [String; 4] {
        [
            self.in_edges(node),
            self.out_edges(node),
            self.parents(node),
            self.children(node),
        ]
    }

    // --- Index keys ---

    /// Presence set: `{ns}:i:{n|e}:{key}`
    pub fn presence(&self, kind: EntityKind, key: &str) -> String {
        format!("{}{SEP}i{SEP}{}{SEP}{}", self.ns, kind.tag(), key)
    }

    /// Value set: `{ns}:i:{n|e}:{key}:{value}`
    pub fn value_set(&self, kind: EntityKind, key: &str, value: &str) -> String {
        format!("{}{SEP}{}", self.presence(kind, key), value)
    }

    fn node_suffix(&self, node: NodeId, suffix: &str) -> String {
        format!(
            "{}{SEP}{}",
            self.entity_root(EntityKind::Node, node.as_u64()),
            suffix
        )
    }

    fn edge_suffix(&self, edge: EdgeId, suffix: &str) -> String {
        format!(
            "{}{SEP}{}",
            self.entity_root(EntityKind::Edge, edge.as_u64()),
            suffix
        )
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self {
            ns: DEFAULT_NAMESPACE.to_string(),
        }
    }
}
