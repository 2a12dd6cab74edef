//! Consistent hash ring with virtual nodes
//!
//! Every real node is placed on the ring `replicas` times, at
//! `hash(i.to_string() + node)` for `i in 0..replicas`. A key belongs to the
//! first point clockwise from its own hash, wrapping past the largest point
//! back to the smallest.
//!
//! The ring is not synchronized. Build it once, then share it read-only, or
//! wrap it in a lock as [`RingPeerPicker`](crate::peers::RingPeerPicker) does.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Maps bytes onto the ring
pub type HashFn = fn(&[u8]) -> u32;

/// CRC32 (IEEE) checksum, the default ring hash
pub fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual-node hashes
    keys: Vec<u32>,
    /// Virtual-node hash -> real node
    hash_map: HashMap<u32, String>,
    nodes: BTreeSet<String>,
}

impl HashRing {
    /// Create a ring placing each node `replicas` times. `None` selects CRC32.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32_ieee),
            replicas,
            keys: Vec::new(),
            hash_map: HashMap::new(),
            nodes: BTreeSet::new(),
        }
    }

    /// Add real nodes. Nodes already on the ring are skipped.
    ///
    /// When a virtual point collides with one that is already placed, the
    /// existing owner keeps it.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for node in nodes {
            let node = node.into();
            if self.nodes.contains(&node) {
                debug!(node = %node, "node already on the ring");
                continue;
            }

            for i in 0..self.replicas {
                let point = (self.hash)(format!("{i}{node}").as_bytes());
                if let Some(owner) = self.hash_map.get(&point) {
                    debug!(node = %node, owner = %owner, point, "virtual node collision");
                    continue;
                }
                self.keys.push(point);
                self.hash_map.insert(point, node.clone());
            }
            self.nodes.insert(node);
        }
        self.keys.sort_unstable();
    }

    /// Remove a real node and all of its virtual points
    pub fn remove(&mut self, node: &str) -> bool {
        if !self.nodes.remove(node) {
            return false;
        }
        self.hash_map.retain(|_, owner| owner != node);
        let hash_map = &self.hash_map;
        self.keys.retain(|point| hash_map.contains_key(point));
        true
    }

    /// Node owning `key`, or `None` when the ring is empty
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&point| point < hash);
        let point = self.keys[idx % self.keys.len()];
        self.hash_map.get(&point).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of virtual points on the ring
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Real nodes, in name order
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reads the input as a decimal number so ring positions are predictable
    fn decimal(data: &[u8]) -> u32 {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    #[test]
    fn test_hashing() {
        let mut ring = HashRing::new(3, Some(decimal));

        // 2, 4, 6, 12, 14, 16, 22, 24, 26
        ring.add(["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, node) in cases {
            assert_eq!(ring.get(key), Some(node), "asking for {key}");
        }

        // 8, 18, 28
        ring.add(["8"]);
        assert_eq!(ring.get("27"), Some("8"));
    }

    #[test]
    fn test_inclusive_match() {
        let mut ring = HashRing::new(1, Some(decimal));
        ring.add(["05", "010"]);

        assert_eq!(ring.get("5"), Some("05"));
        assert_eq!(ring.get("6"), Some("010"));
    }

    #[test]
    fn test_wrap_around() {
        let mut ring = HashRing::new(1, Some(decimal));
        ring.add(["3", "7"]);

        // 03 -> 3 and 07 -> 7; 99 is past both
        assert_eq!(ring.get("99"), Some("3"));
    }

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(3, None);
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut ring = HashRing::new(10, None);
        ring.add(["a", "b"]);
        let len = ring.len();

        ring.add(["a"]);
        assert_eq!(ring.len(), len);
        assert_eq!(ring.nodes().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_collisions_keep_first_owner() {
        let mut ring = HashRing::new(2, Some(|_: &[u8]| 42));
        ring.add(["a", "b"]);

        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get("x"), Some("a"));
    }

    #[test]
    fn test_deterministic_across_rebuilds() {
        let nodes = ["http://10.0.0.1:8001", "http://10.0.0.2:8002", "http://10.0.0.3:8003"];
        let mut first = HashRing::new(50, None);
        first.add(nodes);
        let mut second = HashRing::new(50, None);
        second.add(nodes.iter().rev().copied());

        for i in 0..500 {
            let key = format!("key-{i}");
            assert_eq!(first.get(&key), first.get(&key));
            assert_eq!(first.get(&key), second.get(&key));
        }
    }

    #[test]
    fn test_remove_only_moves_removed_keys() {
        let mut ring = HashRing::new(50, None);
        ring.add(["a", "b", "c"]);

        let before: Vec<(String, String)> = (0..300)
            .map(|i| {
                let key = format!("key-{i}");
                let owner = ring.get(&key).unwrap().to_string();
                (key, owner)
            })
            .collect();

        assert!(ring.remove("b"));
        assert!(!ring.remove("b"));
        assert_eq!(ring.len(), 100);

        for (key, owner) in before {
            let now = ring.get(&key).unwrap();
            if owner == "b" {
                assert_ne!(now, "b");
            } else {
                assert_eq!(now, owner);
            }
        }
    }
}
