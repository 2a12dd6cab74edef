//! Named cache namespaces
//!
//! A [`Group`] pairs a byte-budgeted LRU store with a user [`Getter`]. On a
//! miss it asks the registered [`PeerPicker`] whether another node owns the
//! key; the owner's answer is returned as-is, anything else is loaded and
//! cached locally.

mod getter;
mod main_cache;
mod stats;

pub use getter::{Getter, GetterFunc};
pub use stats::StatsSnapshot;

use crate::byte_view::ByteView;
use crate::errors::{CacheError, Result};
use crate::eviction::EvictionCallback;
use crate::peers::{FetchRequest, PeerGetter, PeerPicker};
use main_cache::MainCache;
use once_cell::sync::OnceCell;
use stats::GroupStats;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: MainCache,
    peers: OnceCell<Arc<dyn PeerPicker>>,
    stats: GroupStats,
}

impl Group {
    pub(crate) fn new(
        name: String,
        cache_bytes: u64,
        getter: Arc<dyn Getter>,
        on_evicted: Option<EvictionCallback<ByteView>>,
    ) -> Self {
        Self {
            name,
            getter,
            main_cache: MainCache::new(cache_bytes, on_evicted),
            peers: OnceCell::new(),
            stats: GroupStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_bytes(&self) -> u64 {
        self.main_cache.capacity_bytes()
    }

    /// Attach the peer picker. Allowed once per group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers
            .set(peers)
            .map_err(|_| CacheError::MisconfiguredGroup {
                name: self.name.clone(),
                reason: "peers registered more than once".to_string(),
            })
    }

    /// Value for `key`, from the cache, the owning peer, or the loader
    pub fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        self.stats.record_get();

        if let Some(value) = self.main_cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            self.stats.record_hit();
            return Ok(value);
        }

        self.load(key)
    }

    pub fn stats(&self) -> StatsSnapshot {
        let (entries, bytes) = self.main_cache.usage();
        self.stats.snapshot(entries, bytes)
    }

    fn load(&self, key: &str) -> Result<ByteView> {
        if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key) {
                Ok(value) => {
                    self.stats.record_peer_load();
                    return Ok(value);
                }
                Err(err) => {
                    self.stats.record_peer_error();
                    warn!(group = %self.name, key, error = %err, "falling back to local load");
                }
            }
        }

        self.get_locally(key)
    }

    fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let request = FetchRequest::new(self.name.as_str(), key);
        let response = peer
            .get(&request)
            .map_err(|source| CacheError::RemotePeerUnavailable {
                peer: peer.addr().to_string(),
                source,
            })?;
        debug!(group = %self.name, key, peer = peer.addr(), "loaded from peer");
        Ok(ByteView::from(response.value))
    }

    fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.getter.get(key).map_err(|source| {
            self.stats.record_local_load_err();
            CacheError::LoaderFailure {
                key: key.to_string(),
                source,
            }
        })?;
        self.stats.record_local_load();

        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache_bytes", &self.main_cache.capacity_bytes())
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}
