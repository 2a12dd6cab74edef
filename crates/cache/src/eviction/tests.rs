//! Tests for the LRU store

use super::*;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn bytes(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

#[test]
fn test_get() {
    let mut store = LruStore::new(0);
    store.add("key1", bytes("1234"));

    assert_eq!(store.get("key1"), Some(&bytes("1234")));
    assert!(store.get("key2").is_none());
}

#[test]
fn test_remove_oldest_when_over_budget() {
    let (k1, k2, k3) = ("key1", "key2", "k3");
    let (v1, v2, v3) = ("value1", "value2", "v3");
    let capacity = (k1.len() + k2.len() + v1.len() + v2.len()) as u64;

    let mut store = LruStore::new(capacity);
    store.add(k1, bytes(v1));
    store.add(k2, bytes(v2));
    store.add(k3, bytes(v3));

    assert!(store.get(k1).is_none());
    assert_eq!(store.len(), 2);
}

#[test]
fn test_recently_read_entry_survives() {
    let mut store = LruStore::new(12);
    store.add("k1", bytes("v1"));
    store.add("k2", bytes("v2"));
    store.add("k3", bytes("v3"));

    assert!(store.get("k1").is_some());
    store.add("k4", bytes("v4"));

    assert!(store.get("k2").is_none());
    assert!(store.get("k1").is_some());
    assert!(store.get("k3").is_some());
    assert!(store.get("k4").is_some());
}

#[test]
fn test_update_in_place() {
    let mut store = LruStore::new(0);
    store.add("k1", bytes("v1"));
    store.add("k2", bytes("v2"));
    let before = store.used_bytes();

    store.add("k1", bytes("a much longer value"));

    assert_eq!(store.len(), 2);
    assert_eq!(
        store.used_bytes(),
        before + ("a much longer value".len() - "v1".len()) as u64
    );
    assert_eq!(store.keys().next(), Some("k1"));
}

#[test]
fn test_eviction_callback() {
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);

    let mut store = LruStore::with_eviction_callback(
        10,
        Box::new(move |key: &str, _value: &Vec<u8>| {
            sink.lock().unwrap().push(key.to_string());
        }),
    );
    store.add("key1", bytes("123456"));
    store.add("k2", bytes("k2"));
    store.add("k3", bytes("k3"));
    store.add("k4", bytes("k4"));

    assert_eq!(*evicted.lock().unwrap(), vec!["key1", "k2"]);
}

#[test]
fn test_explicit_remove_is_silent() {
    let evicted = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&evicted);

    let mut store = LruStore::with_eviction_callback(
        0,
        Box::new(move |_: &str, _: &String| *sink.lock().unwrap() += 1),
    );
    store.add("a", "1".to_string());
    store.add("b", "2".to_string());

    assert_eq!(store.remove("a"), Some("1".to_string()));
    assert_eq!(store.used_bytes(), 2);
    assert_eq!(*evicted.lock().unwrap(), 0);

    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.used_bytes(), 0);
}

#[test]
fn test_entry_larger_than_capacity_is_not_kept() {
    let mut store = LruStore::new(4);
    store.add("k1", bytes("v1"));
    store.add("big", bytes("too large"));

    assert!(store.is_empty());
    assert_eq!(store.used_bytes(), 0);
}

#[test]
fn test_remove_oldest_on_empty_store() {
    let mut store: LruStore<Vec<u8>> = LruStore::new(0);
    assert!(store.remove_oldest().is_none());
}

proptest! {
    #[test]
    fn test_capacity_invariant(
        capacity in 1u64..64,
        ops in prop::collection::vec(("[a-e]{1,3}", "[a-z]{0,12}", any::<bool>()), 1..64)
    ) {
        let mut store = LruStore::new(capacity);

        for (key, value, read) in ops {
            if read {
                let _ = store.get(&key);
            } else {
                store.add(key, value);
            }

            let key_bytes: u64 = store.keys().map(|k| k.len() as u64).sum();
            let expected = key_bytes + collect_values(&mut store);
            prop_assert!(store.used_bytes() <= capacity);
            prop_assert_eq!(store.used_bytes(), expected);
        }
    }
}

fn collect_values(store: &mut LruStore<String>) -> u64 {
    let keys: Vec<String> = store.keys().map(str::to_string).collect();
    keys.iter()
        .filter_map(|k| store.get(k).map(|v| v.len() as u64))
        .sum()
}
