//! Tier 1: Store primitive contract
//!
//! The graph relies on these behaviors of any `KvStore`. The checks are
//! written against the trait so another backend can reuse them.

use std::sync::Arc;
use std::thread;

use kvgraph::{KvStore, MemoryStore, StoreError};

fn check_scalars<S: KvStore>(store: &S) {
    assert_eq!(store.get("s").unwrap(), None);
    store.set("s", "v").unwrap();
    assert_eq!(store.get("s").unwrap().as_deref(), Some("v"));
    assert_eq!(store.incr("c").unwrap(), 1);
    assert_eq!(store.incr("c").unwrap(), 2);
    assert!(matches!(
        store.incr("s").unwrap_err(),
        StoreError::NotAnInteger { .. }
    ));
}

fn check_sets_vanish_when_empty<S: KvStore>(store: &S) {
    assert!(store.sadd("set", "a").unwrap());
    assert!(!store.sadd("set", "a").unwrap());
    assert_eq!(store.scard("set").unwrap(), 1);
    assert!(store.srem("set", "a").unwrap());
    assert!(!store.exists("set").unwrap());
    assert!(store.smembers("set").unwrap().is_empty());
}

fn check_weighted<S: KvStore>(store: &S) {
    assert_eq!(store.zincrby("z", "m", 2).unwrap(), 2);
    assert_eq!(store.zincrby("z", "m", -2).unwrap(), 0);
    // Zero is kept; removal is the caller's decision
    assert_eq!(store.zscore("z", "m").unwrap(), Some(0));
    assert!(store.zrem("z", "m").unwrap());
    assert!(!store.exists("z").unwrap());
}

fn check_hashes<S: KvStore>(store: &S) {
    assert!(store.hset("h", "f", "1").unwrap());
    assert!(!store.hset("h", "f", "2").unwrap());
    assert_eq!(
        store.hgetall("h").unwrap(),
        vec![("f".to_string(), "2".to_string())]
    );
    assert!(store.hdel("h", "f").unwrap());
    assert!(!store.exists("h").unwrap());
}

fn check_wrong_type<S: KvStore>(store: &S) {
    store.sadd("typed", "x").unwrap();
    assert!(matches!(
        store.hget("typed", "f").unwrap_err(),
        StoreError::WrongType { .. }
    ));
    assert!(matches!(
        store.zincrby("typed", "x", 1).unwrap_err(),
        StoreError::WrongType { .. }
    ));
    assert!(matches!(
        store.get("typed").unwrap_err(),
        StoreError::WrongType { .. }
    ));
}

fn check_intersection<S: KvStore>(store: &S) {
    for m in ["1", "2", "3"] {
        store.sadd("i:a", m).unwrap();
    }
    for m in ["2", "3", "4"] {
        store.sadd("i:b", m).unwrap();
    }
    let keys = vec!["i:a".to_string(), "i:b".to_string()];
    assert_eq!(store.sinter(&keys).unwrap(), vec!["2", "3"]);
    let with_missing = vec!["i:a".to_string(), "i:none".to_string()];
    assert!(store.sinter(&with_missing).unwrap().is_empty());
    assert!(store.sinter(&[]).unwrap().is_empty());
}

#[test]
fn memory_store_meets_contract() {
    let store = MemoryStore::new();
    check_scalars(&store);
    check_sets_vanish_when_empty(&store);
    check_weighted(&store);
    check_hashes(&store);
    check_wrong_type(&store);
    check_intersection(&store);
}

#[test]
fn presized_store_meets_contract() {
    let store = MemoryStore::with_capacity(64);
    assert!(store.is_empty());
    check_scalars(&store);
    check_hashes(&store);
    check_intersection(&store);
    assert!(!store.is_empty());
}

#[test]
fn flush_drops_every_key() {
    let store = MemoryStore::new();
    check_scalars(&store);
    check_intersection(&store);
    let writes = store.write_count();

    store.flush();
    assert!(store.is_empty());
    assert!(store.keys().is_empty());
    assert_eq!(store.get("c").unwrap(), None);
    assert!(store.write_count() > writes);
    assert_eq!(store.incr("c").unwrap(), 1);
}

#[test]
fn memory_store_atomic_counters() {
    let store = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..100 {
                    store.incr("n").unwrap();
                    store.zincrby("z", "m", 1).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(store.get("n").unwrap().as_deref(), Some("800"));
    assert_eq!(store.zscore("z", "m").unwrap(), Some(800));
}
