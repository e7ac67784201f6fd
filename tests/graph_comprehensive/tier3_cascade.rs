//! Tier 3: Adjacency and cascading deletion

use crate::test_utils::*;
use kvgraph::{EdgeId, Neighbor};

#[test]
fn multiplicity_tracks_parallel_edges() {
    let (_store, g) = setup();
    let p = g.add_node(no_props()).unwrap();
    let c = g.add_node(no_props()).unwrap();
    let edges: Vec<EdgeId> = (0..3)
        .map(|_| g.add_edge(p, c, no_props()).unwrap().id())
        .collect();

    assert_eq!(p.children().unwrap(), vec![Neighbor { node: c.id(), edges: 3 }]);
    assert_eq!(c.parents().unwrap(), vec![Neighbor { node: p.id(), edges: 3 }]);

    for (i, e) in edges.iter().enumerate() {
        g.del_edge(*e).unwrap();
        let left = 2 - i as u64;
        if left == 0 {
            assert!(p.children().unwrap().is_empty());
            assert!(c.parents().unwrap().is_empty());
        } else {
            assert_eq!(p.children().unwrap()[0].edges, left);
            assert_eq!(c.parents().unwrap()[0].edges, left);
        }
    }
}

#[test]
fn children_order_by_edge_count() {
    let (_store, g) = setup();
    let hub = g.add_node(no_props()).unwrap();
    let once = g.add_node(no_props()).unwrap();
    let twice = g.add_node(no_props()).unwrap();
    g.add_edge(hub, twice, no_props()).unwrap();
    g.add_edge(hub, twice, no_props()).unwrap();
    g.add_edge(hub, once, no_props()).unwrap();

    let children = hub.children().unwrap();
    assert_eq!(children[0], Neighbor { node: once.id(), edges: 1 });
    assert_eq!(children[1], Neighbor { node: twice.id(), edges: 2 });
}

#[test]
fn deleting_middle_of_chain() {
    let (store, g) = setup();
    let a = g.add_node([("pos", "head")]).unwrap();
    let b = g.add_node([("pos", "mid")]).unwrap();
    let c = g.add_node([("pos", "tail")]).unwrap();
    let ab = g.add_edge(a, b, no_props()).unwrap();
    let bc = g.add_edge(b, c, no_props()).unwrap();
    let ac = g.add_edge(a, c, no_props()).unwrap();

    let report = g.del_node(b).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.removed_edges, vec![ab.id(), bc.id()]);

    assert_eq!(a.out_edges().unwrap().len(), 1);
    assert_eq!(a.out_edges().unwrap()[0].id(), ac.id());
    assert_eq!(c.in_edges().unwrap()[0].id(), ac.id());
    assert_eq!(a.children().unwrap(), vec![Neighbor { node: c.id(), edges: 1 }]);
    assert_eq!(c.parents().unwrap(), vec![Neighbor { node: a.id(), edges: 1 }]);
    assert!(g.get_nodes([("pos", "mid")]).unwrap().is_empty());
    assert!(data_keys(&store, "rgr").iter().all(|k| !k.starts_with("rgr:n:1:")));
}

#[test]
fn clear_wipes_data_keys() {
    let (store, g) = setup();
    let a = g.add_node([("k", "1")]).unwrap();
    let b = g.add_node([("k", "2")]).unwrap();
    g.add_edge(a, b, [("rel", "r")]).unwrap();
    g.add_edge(b, a, [("rel", "r")]).unwrap();

    let report = g.clear().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.removed_edges.len(), 2);
    assert!(data_keys(&store, "rgr").is_empty());
    assert_eq!(g.node_count().unwrap(), 0);
}

#[test]
fn edge_endpoint_handles() {
    let (_store, g) = setup();
    let a = g.add_node([("name", "alice")]).unwrap();
    let b = g.add_node([("name", "bob")]).unwrap();
    let e = g.add_edge(a, b, no_props()).unwrap();

    assert_eq!(
        e.in_node().unwrap().get("name").unwrap().as_deref(),
        Some("alice")
    );
    assert_eq!(
        e.out_node().unwrap().get("name").unwrap().as_deref(),
        Some("bob")
    );
}
