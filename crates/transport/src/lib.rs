//! HTTP transport for peercache
//!
//! A node serves its groups to other peers under `{base_path}{group}/{key}`
//! and fetches keys owned by other peers through [`HttpGetter`]. [`HttpPool`]
//! ties the two together with a consistent hash ring.

pub mod client;
pub mod errors;
pub mod pool;
pub mod server;

pub use client::HttpGetter;
pub use errors::{Result, TransportError};
pub use pool::{HttpPool, PoolOptions, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
pub use server::{api_router, peer_router, serve};
