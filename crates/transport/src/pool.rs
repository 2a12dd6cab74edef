//! HTTP peer pool: the ring of peers plus the server side of this node

use crate::client::HttpGetter;
use crate::errors::Result;
use crate::server::peer_router;
use axum::Router;
use peercache_cache::{PeerGetter, PeerPicker, Registry, RingPeerPicker};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Default prefix of the peer endpoint
pub const DEFAULT_BASE_PATH: &str = "/_peercache/";
/// Default number of virtual nodes per peer
pub const DEFAULT_REPLICAS: usize = 50;

/// Settings shared by every peer of a pool
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub base_path: String,
    pub replicas: usize,
    pub request_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Picks peers by consistent hashing and talks to them over HTTP
pub struct HttpPool {
    self_url: String,
    options: PoolOptions,
    runtime: Handle,
    picker: RingPeerPicker,
}

impl HttpPool {
    /// `self_url` is this node's base URL, e.g. `http://127.0.0.1:8001`
    pub fn new(self_url: impl Into<String>, options: PoolOptions, runtime: Handle) -> Self {
        let self_url = self_url.into();
        let picker = RingPeerPicker::new(self_url.clone(), options.replicas);
        Self {
            self_url,
            options,
            runtime,
            picker,
        }
    }

    /// Replace the set of peers. Include `self_url` so this node owns its share.
    pub fn set<I, S>(&self, peers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut getters: Vec<(String, Arc<dyn PeerGetter>)> = Vec::new();
        for peer in peers {
            let peer = peer.as_ref();
            let getter = HttpGetter::new(
                peer,
                &self.options.base_path,
                self.options.request_timeout,
                self.runtime.clone(),
            )?;
            getters.push((peer.to_string(), Arc::new(getter)));
        }
        self.picker.set_peers(getters);
        Ok(())
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    pub fn peers(&self) -> Vec<String> {
        self.picker.peers()
    }

    /// Router answering peer requests for groups in `registry`
    pub fn router(&self, registry: Arc<Registry>) -> Router {
        peer_router(registry, &self.options.base_path)
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        self.picker.pick_peer(key)
    }
}
