//! Error types for the group cache
//!
//! Store-level operations never fail: a missing key is an `Option`, not an
//! error. Only loader and peer failures are errors, and they are attributed
//! to the outermost [`Group::get`](crate::Group::get) call.

use crate::peers::PeerError;

/// Boxed error returned by user-supplied loaders
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors surfaced by groups and the registry
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An empty key was passed to `Group::get`
    #[error("key is required")]
    EmptyKey,

    /// The group's loader failed; nothing was cached
    #[error("loader failed for key '{key}': {source}")]
    LoaderFailure {
        key: String,
        #[source]
        source: BoxError,
    },

    /// A remote peer could not serve the key
    #[error("peer '{peer}' unavailable: {source}")]
    RemotePeerUnavailable {
        peer: String,
        #[source]
        source: PeerError,
    },

    /// A group was set up incorrectly
    #[error("group '{name}' is misconfigured: {reason}")]
    MisconfiguredGroup { name: String, reason: String },
}

impl CacheError {
    /// Whether the error came from the user loader
    #[must_use]
    pub const fn is_loader_failure(&self) -> bool {
        matches!(self, Self::LoaderFailure { .. })
    }
}
