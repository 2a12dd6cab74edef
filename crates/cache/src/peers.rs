//! Peer selection and remote fetch contracts
//!
//! A [`PeerPicker`] decides which node owns a key; a [`PeerGetter`] asks one
//! specific node for it. Transports implement [`PeerGetter`]; the
//! [`RingPeerPicker`] maps keys onto getters with a [`HashRing`].

use crate::consistent_hash::{HashFn, HashRing};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Ask the owner of `key` in `group` for its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub group: String,
    pub key: String,
}

impl FetchRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub value: Vec<u8>,
}

/// Why a remote fetch did not produce a value
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// The request never got an answer
    #[error("network error: {0}")]
    Network(String),

    /// The peer does not know the group
    #[error("peer has no group '{0}'")]
    GroupNotFound(String),

    /// The peer answered with a failure status
    #[error("peer returned {status}: {message}")]
    Remote { status: u16, message: String },
}

/// Locates the peer that owns a key
pub trait PeerPicker: Send + Sync {
    /// `None` means the key is local (or there are no peers)
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a key from one specific peer
pub trait PeerGetter: Send + Sync {
    fn get(&self, request: &FetchRequest) -> Result<FetchResponse, PeerError>;

    /// Address used to identify the peer in logs
    fn addr(&self) -> &str;
}

/// Ring-backed [`PeerPicker`] over any set of getters.
///
/// `self_id` names this node on the ring; keys landing on it are reported as
/// local.
pub struct RingPeerPicker {
    self_id: String,
    replicas: usize,
    hash: Option<HashFn>,
    state: RwLock<PeerSet>,
}

struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<dyn PeerGetter>>,
}

impl RingPeerPicker {
    pub fn new(self_id: impl Into<String>, replicas: usize) -> Self {
        Self::with_hash(self_id, replicas, None)
    }

    pub fn with_hash(self_id: impl Into<String>, replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            self_id: self_id.into(),
            replicas,
            hash,
            state: RwLock::new(PeerSet {
                ring: HashRing::new(replicas, hash),
                getters: HashMap::new(),
            }),
        }
    }

    /// Replace the peer set. Include this node's own id so it owns its share.
    pub fn set_peers<I>(&self, peers: I)
    where
        I: IntoIterator<Item = (String, Arc<dyn PeerGetter>)>,
    {
        let mut ring = HashRing::new(self.replicas, self.hash);
        let mut getters = HashMap::new();
        for (id, getter) in peers {
            ring.add([id.clone()]);
            getters.insert(id, getter);
        }

        info!(
            self_id = %self.self_id,
            peers = ring.nodes().count(),
            "peer set updated"
        );
        *self.state.write() = PeerSet { ring, getters };
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Real nodes on the ring
    pub fn peers(&self) -> Vec<String> {
        self.state.read().ring.nodes().map(str::to_string).collect()
    }
}

impl PeerPicker for RingPeerPicker {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let owner = state.ring.get(key)?;
        if owner == self.self_id {
            return None;
        }

        debug!(key, peer = %owner, "picked peer");
        state.getters.get(owner).cloned()
    }
}
