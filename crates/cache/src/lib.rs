//! Group cache for peercache
//!
//! This crate provides the node-local half of the distributed cache:
//! - A byte-budgeted LRU store
//! - Immutable byte views for cached values
//! - Named groups with a loader and a name registry
//! - A consistent hash ring with virtual nodes
//! - Peer selection and remote fetch contracts

pub mod byte_view;
pub mod consistent_hash;
pub mod errors;
pub mod eviction;
pub mod group;
pub mod peers;
pub mod registry;

pub use byte_view::ByteView;
pub use consistent_hash::{HashFn, HashRing};
pub use errors::{BoxError, CacheError, Result};
pub use eviction::{ByteSize, EvictionCallback, LruStore};
pub use group::{Getter, GetterFunc, Group, StatsSnapshot};
pub use peers::{FetchRequest, FetchResponse, PeerError, PeerGetter, PeerPicker, RingPeerPicker};
pub use registry::{get_group, new_group, GroupBuilder, Registry};
