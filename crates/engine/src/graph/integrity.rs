//! Structural audit of a stored graph.
//!
//! Adjacency and the property index are derived data. The audit rebuilds
//! what they should contain from entity data (edge links and property maps)
//! and compares it with what the store holds. Nothing is repaired; every
//! divergence comes back as a [`ConsistencyWarning`].
//!
//! Index buckets are found through the keys and values entities hold. A
//! stale bucket for a value that no entity holds any more is not reachable
//! without scanning the keyspace and is not reported.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use kvgraph_core::{
    ConsistencyWarning, Direction, EdgeId, EndpointRole, EntityKind, NodeId, Properties, Relation,
    Result,
};
use kvgraph_storage::KvStore;

use super::snapshot::GraphSnapshot;
use super::types::Neighbor;
use super::Graph;

/// Outcome of [`Graph::verify`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntegrityReport {
    /// Nodes inspected.
    pub nodes_checked: usize,
    /// Edges inspected.
    pub edges_checked: usize,
    /// Every divergence found.
    pub warnings: Vec<ConsistencyWarning>,
}

impl IntegrityReport {
    /// True when derived data matches entity data everywhere it was checked.
    pub fn is_consistent(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl<S: KvStore> Graph<S> {
    /// Check adjacency and the property index against entity data.
    pub fn verify(&self) -> Result<IntegrityReport> {
        let snapshot = self.snapshot()?;
        let mut warnings = check_adjacency(&snapshot);

        let nodes: BTreeMap<u64, &Properties> = snapshot
            .nodes
            .iter()
            .map(|n| (n.id.as_u64(), &n.properties))
            .collect();
        let edges: BTreeMap<u64, &Properties> = snapshot
            .edges
            .iter()
            .map(|e| (e.id.as_u64(), &e.properties))
            .collect();
        warnings.extend(self.check_index(EntityKind::Node, &nodes)?);
        warnings.extend(self.check_index(EntityKind::Edge, &edges)?);

        let report = IntegrityReport {
            nodes_checked: snapshot.node_count(),
            edges_checked: snapshot.edge_count(),
            warnings,
        };
        debug!(
            namespace = %self.namespace(),
            nodes = report.nodes_checked,
            edges = report.edges_checked,
            warnings = report.warnings.len(),
            "Integrity check finished"
        );
        self.log_warnings("verify", &report.warnings);
        Ok(report)
    }

    fn check_index(
        &self,
        kind: EntityKind,
        entities: &BTreeMap<u64, &Properties>,
    ) -> Result<Vec<ConsistencyWarning>> {
        let index = self.index();
        let mut warnings = Vec::new();

        // key -> values held by at least one entity
        let mut held: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for properties in entities.values() {
            for (key, value) in properties.iter() {
                held.entry(key.as_str()).or_default().insert(value.as_str());
            }
        }

        for (key, values) in &held {
            let present: BTreeSet<u64> = index.candidates_with_key(kind, key)?.into_iter().collect();
            for (&id, properties) in entities {
                if properties.contains_key(*key) && !present.contains(&id) {
                    warnings.push(ConsistencyWarning::MissingPresence {
                        kind,
                        id,
                        key: key.to_string(),
                    });
                }
            }
            for &id in &present {
                let holds = entities
                    .get(&id)
                    .map_or(false, |p| p.contains_key(*key));
                if !holds {
                    warnings.push(ConsistencyWarning::StalePresence {
                        kind,
                        id,
                        key: key.to_string(),
                    });
                }
            }

            for value in values {
                let indexed: BTreeSet<u64> =
                    index.value_members(kind, key, value)?.into_iter().collect();
                for (&id, properties) in entities {
                    let matches = properties.get(*key).map(String::as_str) == Some(*value);
                    if matches && !indexed.contains(&id) {
                        warnings.push(ConsistencyWarning::MissingValueIndex {
                            kind,
                            id,
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
                for &id in &indexed {
                    let matches = entities
                        .get(&id)
                        .and_then(|p| p.get(*key))
                        .map(String::as_str)
                        == Some(*value);
                    if !matches {
                        warnings.push(ConsistencyWarning::StaleValueIndex {
                            kind,
                            id,
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
        }
        Ok(warnings)
    }
}

/// Compare stored adjacency with what the edge links imply.
fn check_adjacency(snapshot: &GraphSnapshot) -> Vec<ConsistencyWarning> {
    let mut warnings = Vec::new();
    let node_ids: BTreeSet<NodeId> = snapshot.nodes.iter().map(|n| n.id).collect();
    let links: BTreeMap<EdgeId, (Option<NodeId>, Option<NodeId>)> = snapshot
        .edges
        .iter()
        .map(|e| (e.id, (e.source, e.target)))
        .collect();

    // (node, neighbor) -> expected edge count
    let mut children: BTreeMap<(NodeId, NodeId), i64> = BTreeMap::new();
    let mut parents: BTreeMap<(NodeId, NodeId), i64> = BTreeMap::new();

    for edge in &snapshot.edges {
        for (role, link) in [
            (EndpointRole::Source, edge.source),
            (EndpointRole::Target, edge.target),
        ] {
            match link {
                None => warnings.push(ConsistencyWarning::MissingLink {
                    edge: edge.id,
                    role,
                }),
                Some(node) if !node_ids.contains(&node) => {
                    warnings.push(ConsistencyWarning::MissingEndpoint {
                        edge: edge.id,
                        role,
                        node,
                    })
                }
                Some(_) => {}
            }
        }
        if let (Some(source), Some(target)) = (edge.source, edge.target) {
            *children.entry((source, target)).or_default() += 1;
            *parents.entry((target, source)).or_default() += 1;
        }
    }

    for node in &snapshot.nodes {
        check_edge_set(node.id, &node.out_edges, Direction::Outgoing, &links, &mut warnings);
        check_edge_set(node.id, &node.in_edges, Direction::Incoming, &links, &mut warnings);
        check_weighted(node.id, &node.children, Relation::Children, &children, &mut warnings);
        check_weighted(node.id, &node.parents, Relation::Parents, &parents, &mut warnings);
    }

    // Every live endpoint lists the edge
    for edge in &snapshot.edges {
        for (node, direction) in [
            (edge.source, Direction::Outgoing),
            (edge.target, Direction::Incoming),
        ] {
            let Some(node) = node else { continue };
            let Some(stored) = snapshot.node(node) else {
                continue;
            };
            let listed = match direction {
                Direction::Outgoing => &stored.out_edges,
                Direction::Incoming => &stored.in_edges,
            };
            if !listed.contains(&edge.id) {
                warnings.push(ConsistencyWarning::MissingEdgeEntry {
                    node,
                    edge: edge.id,
                    direction,
                });
            }
        }
    }

    warnings
}

fn check_edge_set(
    node: NodeId,
    listed: &[EdgeId],
    direction: Direction,
    links: &BTreeMap<EdgeId, (Option<NodeId>, Option<NodeId>)>,
    warnings: &mut Vec<ConsistencyWarning>,
) {
    for &edge in listed {
        let Some(&(source, target)) = links.get(&edge) else {
            warnings.push(ConsistencyWarning::DanglingEdge { node, edge });
            continue;
        };
        let endpoint = match direction {
            Direction::Outgoing => source,
            Direction::Incoming => target,
        };
        if endpoint != Some(node) {
            warnings.push(ConsistencyWarning::StrayEdgeEntry {
                node,
                edge,
                direction,
            });
        }
    }
}

fn check_weighted(
    node: NodeId,
    stored: &[Neighbor],
    relation: Relation,
    expected: &BTreeMap<(NodeId, NodeId), i64>,
    warnings: &mut Vec<ConsistencyWarning>,
) {
    let mut seen = BTreeSet::new();
    for entry in stored {
        seen.insert(entry.node);
        let want = expected.get(&(node, entry.node)).copied().unwrap_or(0);
        let found = i64::try_from(entry.edges).unwrap_or(i64::MAX);
        if found != want {
            warnings.push(ConsistencyWarning::CountMismatch {
                node,
                neighbor: entry.node,
                relation,
                expected: want,
                found,
            });
        }
    }
    for (&(owner, neighbor), _) in expected.range((node, NodeId::new(0))..) {
        if owner != node {
            break;
        }
        if !seen.contains(&neighbor) {
            warnings.push(ConsistencyWarning::MissingNeighbor {
                node,
                neighbor,
                relation,
            });
        }
    }
}
