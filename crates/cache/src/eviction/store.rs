//! Byte-budgeted LRU store

use super::arena::RecencyList;
use std::collections::HashMap;
use std::fmt;

/// Values held by an [`LruStore`] report how many bytes they occupy
pub trait ByteSize {
    fn byte_len(&self) -> usize;
}

impl ByteSize for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

/// Called once for every entry evicted by [`LruStore::remove_oldest`]
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

/// Least-recently-used map bounded by the total size of keys and values.
///
/// A capacity of zero means unlimited. The store does no locking of its own;
/// callers that share it across threads must serialize access.
pub struct LruStore<V> {
    capacity_bytes: u64,
    used_bytes: u64,
    order: RecencyList<V>,
    index: HashMap<String, usize>,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: ByteSize> LruStore<V> {
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            used_bytes: 0,
            order: RecencyList::new(),
            index: HashMap::new(),
            on_evicted: None,
        }
    }

    pub fn with_eviction_callback(capacity_bytes: u64, on_evicted: EvictionCallback<V>) -> Self {
        let mut store = Self::new(capacity_bytes);
        store.on_evicted = Some(on_evicted);
        store
    }

    /// Insert or update `key`, then evict until the byte budget holds
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            let added = value.byte_len() as u64;
            let old = self.order.replace_value(idx, value);
            self.used_bytes = self.used_bytes - old.byte_len() as u64 + added;
            self.order.move_to_front(idx);
        } else {
            self.used_bytes += entry_size(&key, &value);
            let idx = self.order.push_front(key.clone(), value);
            self.index.insert(key, idx);
        }

        while self.capacity_bytes != 0 && self.used_bytes > self.capacity_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    /// Look up `key`, marking it most recently used
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.order.move_to_front(idx);
        Some(self.order.value(idx))
    }

    /// Evict the least recently used entry
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.order.tail()?;
        let (key, value) = self.order.remove(idx);
        self.index.remove(&key);
        self.used_bytes -= entry_size(&key, &value);

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&key, &value);
        }
        Some((key, value))
    }

    /// Drop `key` without notifying the eviction callback
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.index.remove(key)?;
        let (key, value) = self.order.remove(idx);
        self.used_bytes -= entry_size(&key, &value);
        Some(value)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
        self.used_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.len() == 0
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.keys()
    }
}

impl<V> fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("capacity_bytes", &self.capacity_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.order.len())
            .finish()
    }
}

fn entry_size<V: ByteSize>(key: &str, value: &V) -> u64 {
    (key.len() + value.byte_len()) as u64
}
