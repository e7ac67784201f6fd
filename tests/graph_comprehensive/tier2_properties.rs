//! Tier 2: Entities and properties

use crate::test_utils::*;
use kvgraph::{EdgeId, EntityKind, GraphError, KvStore, NodeId};

#[test]
fn round_trip_node_properties() {
    let (_store, g) = setup();
    let n = g
        .add_node([("name", "alice"), ("city", "NYC"), ("note", "a:b:c")])
        .unwrap();
    let props = g.node(n.id()).unwrap().properties().unwrap();
    assert_eq!(props.len(), 3);
    assert_eq!(props["note"], "a:b:c");
    assert_eq!(n.get("missing").unwrap(), None);
}

#[test]
fn unicode_and_empty_values_are_indexed() {
    let (_store, g) = setup();
    let n = g.add_node([("名前", "東京"), ("empty", "")]).unwrap();
    assert_eq!(ids(&g.get_nodes([("名前", "東京")]).unwrap()), vec![n.id()]);
    assert_eq!(ids(&g.get_nodes([("empty", "")]).unwrap()), vec![n.id()]);
    assert_eq!(ids(&g.find_nodes([("empty", "^$")]).unwrap()), vec![n.id()]);
}

#[test]
fn node_and_edge_indexes_are_separate() {
    let (_store, g) = setup();
    let a = g.add_node([("kind", "x")]).unwrap();
    let b = g.add_node([("kind", "y")]).unwrap();
    let e = g.add_edge(a, b, [("kind", "x")]).unwrap();

    assert_eq!(ids(&g.get_nodes([("kind", "x")]).unwrap()), vec![a.id()]);
    let edges = g.get_edges([("kind", "x")]).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].id(), e.id());
}

#[test]
fn invalid_property_keys_rejected() {
    let (store, g) = setup();
    assert!(matches!(
        g.add_node([("", "v")]).unwrap_err(),
        GraphError::InvalidInput(_)
    ));
    let n = g.add_node(no_props()).unwrap();
    let writes = store.write_count();
    assert!(matches!(
        n.set("a:b", "v").unwrap_err(),
        GraphError::InvalidInput(_)
    ));
    assert_eq!(store.write_count(), writes);
}

#[test]
fn overwrite_keeps_presence_and_moves_value() {
    let (store, g) = setup();
    let n = g.add_node([("city", "NYC")]).unwrap();
    let other = g.add_node([("city", "NYC")]).unwrap();
    n.set("city", "LA").unwrap();

    assert_eq!(ids(&g.get_nodes([("city", "NYC")]).unwrap()), vec![other.id()]);
    assert_eq!(ids(&g.get_nodes([("city", "LA")]).unwrap()), vec![n.id()]);
    assert_eq!(store.scard("rgr:i:n:city").unwrap(), 2);
}

#[test]
fn delete_property_then_set_again() {
    let (store, g) = setup();
    let n = g.add_node([("tag", "t1")]).unwrap();
    assert_eq!(n.delete("tag").unwrap(), "t1");
    assert!(data_keys(&store, "rgr")
        .iter()
        .all(|k| !k.starts_with("rgr:i:")));
    assert_eq!(n.set("tag", "t2").unwrap(), None);
    assert_eq!(ids(&g.get_nodes([("tag", "t2")]).unwrap()), vec![n.id()]);
}

#[test]
fn property_access_by_kind_and_id() {
    let (_store, g) = setup();
    let a = g.add_node(no_props()).unwrap();
    let b = g.add_node(no_props()).unwrap();
    let e = g.add_edge(a, b, [("w", "1")]).unwrap();

    let raw = e.id().as_u64();
    assert_eq!(
        g.get_property(EntityKind::Edge, raw, "w").unwrap().as_deref(),
        Some("1")
    );
    assert_eq!(
        g.set_property(EntityKind::Edge, raw, "w", "2").unwrap().as_deref(),
        Some("1")
    );
    assert_eq!(g.del_property(EntityKind::Edge, raw, "w").unwrap(), "2");
    assert!(matches!(
        g.del_property(EntityKind::Edge, raw, "w").unwrap_err(),
        GraphError::NotFound { kind: EntityKind::Edge, .. }
    ));
    assert!(matches!(
        g.properties(EntityKind::Edge, 99).unwrap_err(),
        GraphError::UnknownEntity { kind: EntityKind::Edge, id: 99 }
    ));
}

#[test]
fn ids_are_dense_and_independent() {
    let (_store, g) = setup();
    let a = g.add_node(no_props()).unwrap();
    let b = g.add_node(no_props()).unwrap();
    let e0 = g.add_edge(a, b, no_props()).unwrap();
    let c = g.add_node(no_props()).unwrap();
    let e1 = g.add_edge(b, c, no_props()).unwrap();

    assert_eq!(ids(&[a, b, c]), vec![NodeId::new(0), NodeId::new(1), NodeId::new(2)]);
    assert_eq!((e0.id(), e1.id()), (EdgeId::new(0), EdgeId::new(1)));
}
