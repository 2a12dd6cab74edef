//! Transport errors

/// Result type for transport setup
pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A peer address could not be turned into a request URL
    #[error("invalid peer url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be built
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    /// Binding or serving failed
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
