//! Tier 4: Drift handling, audit and snapshot
//!
//! Drift is injected by writing to the store behind the graph's back.

use crate::test_utils::*;
use kvgraph::{ConsistencyWarning, EndpointRole, GraphSnapshot, KvStore, NodeId};

#[test]
fn delete_continues_past_dangling_edge() {
    let (store, g) = setup();
    let a = g.add_node([("name", "a")]).unwrap();
    let b = g.add_node(no_props()).unwrap();
    let e = g.add_edge(a, b, no_props()).unwrap();
    store.sadd("rgr:n:0:ie", "13").unwrap();

    let report = g.del_node(a).unwrap();
    assert_eq!(report.removed_edges, vec![e.id()]);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        ConsistencyWarning::DanglingEdge { .. }
    ));
    assert!(!g.has_node(a).unwrap());
    assert!(g.get_nodes([("name", "a")]).unwrap().is_empty());
    assert!(g.verify().unwrap().is_consistent());
}

#[test]
fn edge_with_removed_source_still_deletes() {
    let (store, g) = setup();
    let a = g.add_node(no_props()).unwrap();
    let b = g.add_node(no_props()).unwrap();
    let e = g.add_edge(a, b, [("rel", "x")]).unwrap();
    store.del("rgr:e:0:in").unwrap();

    let report = g.del_edge(e).unwrap();
    assert_eq!(
        report.warnings,
        vec![ConsistencyWarning::MissingLink {
            edge: e.id(),
            role: EndpointRole::Source
        }]
    );
    assert!(b.in_edges().unwrap().is_empty());
    assert!(!g.has_edge(e).unwrap());
    assert!(g.get_edges([("rel", "x")]).unwrap().is_empty());
}

#[test]
fn audit_flags_injected_drift() {
    let (store, g) = setup();
    let a = g.add_node([("city", "NYC")]).unwrap();
    let b = g.add_node(no_props()).unwrap();
    g.add_edge(a, b, no_props()).unwrap();
    assert!(g.verify().unwrap().is_consistent());

    store.zincrby("rgr:n:1:pn", "0", 1).unwrap();
    store.srem("rgr:i:n:city:NYC", "0").unwrap();

    let report = g.verify().unwrap();
    assert_eq!(report.nodes_checked, 2);
    assert_eq!(report.edges_checked, 1);
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn snapshot_serializes_and_restores() {
    let (_store, g) = setup();
    let a = g.add_node([("name", "alice")]).unwrap();
    let b = g.add_node([("name", "bob")]).unwrap();
    g.add_edge(a, b, [("rel", "knows")]).unwrap();

    let snapshot = g.snapshot().unwrap();
    let json = snapshot.to_json().unwrap();
    let restored: GraphSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, snapshot);
    assert_eq!(restored.node(NodeId::new(1)).unwrap().parents[0].node, a.id());
}

#[test]
fn warnings_serialize_for_reporting() {
    let (store, g) = setup();
    let a = g.add_node(no_props()).unwrap();
    store.sadd("rgr:n:0:oe", "5").unwrap();
    let report = g.del_node(a).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["warnings"][0]["DanglingEdge"]["edge"], 5);
    assert_eq!(json["removed_edges"].as_array().unwrap().len(), 0);
}
