//! Mutex-guarded store owned by a group

use crate::byte_view::ByteView;
use crate::eviction::{EvictionCallback, LruStore};
use parking_lot::Mutex;

/// Serializes every store operation of one group behind a single lock.
///
/// The store itself is built on the first `add`, so groups that never load
/// anything never allocate one.
pub(crate) struct MainCache {
    capacity_bytes: u64,
    inner: Mutex<Inner>,
}

struct Inner {
    lru: Option<LruStore<ByteView>>,
    on_evicted: Option<EvictionCallback<ByteView>>,
}

impl MainCache {
    pub(crate) fn new(capacity_bytes: u64, on_evicted: Option<EvictionCallback<ByteView>>) -> Self {
        Self {
            capacity_bytes,
            inner: Mutex::new(Inner {
                lru: None,
                on_evicted,
            }),
        }
    }

    pub(crate) fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        let capacity_bytes = self.capacity_bytes;
        let Inner { lru, on_evicted } = &mut *inner;

        let lru = lru.get_or_insert_with(|| match on_evicted.take() {
            Some(callback) => LruStore::with_eviction_callback(capacity_bytes, callback),
            None => LruStore::new(capacity_bytes),
        });
        lru.add(key, value);
    }

    pub(crate) fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        inner.lru.as_mut()?.get(key).cloned()
    }

    /// Entry count and bytes in use
    pub(crate) fn usage(&self) -> (usize, u64) {
        let inner = self.inner.lock();
        inner
            .lru
            .as_ref()
            .map_or((0, 0), |lru| (lru.len(), lru.used_bytes()))
    }

    pub(crate) fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }
}
