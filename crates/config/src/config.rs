//! Node configuration with precedence and validation

use crate::errors::{ConfigError, Result};
use crate::loader::{self, FileConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default number of virtual nodes per peer
pub const DEFAULT_REPLICAS: usize = 50;
/// Default prefix of the peer endpoint
pub const DEFAULT_BASE_PATH: &str = "/_peercache/";
/// Default group byte budget
pub const DEFAULT_CACHE_BYTES: u64 = 2 << 10;

/// Everything a node needs to join the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's peer URL, e.g. `http://127.0.0.1:8001`
    pub self_url: String,
    /// Every peer URL in the cluster, this node included
    pub peers: Vec<String>,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Peer endpoint prefix, starts and ends with `/`
    pub base_path: String,
    /// Byte budget of the served group; zero means unlimited
    pub cache_bytes: u64,
    /// Name of the served group
    pub group: String,
    /// Optional public API listener
    pub api_addr: Option<SocketAddr>,
    /// Timeout for requests to other peers
    pub request_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            self_url: "http://127.0.0.1:8001".to_string(),
            peers: Vec::new(),
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            cache_bytes: DEFAULT_CACHE_BYTES,
            group: "scores".to_string(),
            api_addr: None,
            request_timeout_secs: 30,
        }
    }
}

impl NodeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Socket address the peer server should bind, taken from `self_url`
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let url = parse_url("self_url", &self.self_url)?;
        let addrs = url.socket_addrs(|| None).map_err(|e| ConfigError::InvalidValue {
            field: "self_url",
            message: format!("'{}' is not a bindable address: {e}", self.self_url),
        })?;
        addrs.into_iter().next().ok_or_else(|| ConfigError::InvalidValue {
            field: "self_url",
            message: format!("'{}' resolved to no address", self.self_url),
        })
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
    /// Command line argument
    CommandLine,
}

/// Builder applying defaults, then file, then environment, then explicit values
pub struct NodeConfigBuilder {
    config: NodeConfig,
    source: ConfigSource,
}

impl NodeConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: NodeConfig::default(),
            source: ConfigSource::Default,
        }
    }

    /// Layer a JSON configuration file
    pub fn with_file(mut self, path: &Path) -> Result<Self> {
        let file = loader::read_file(path)?;
        self.apply(file);
        self.source = ConfigSource::ConfigFile(path.to_path_buf());
        Ok(self)
    }

    /// Layer `PEERCACHE_*` variables from the process environment
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Layer `PEERCACHE_*` variables from an arbitrary lookup
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (overrides, last_var) = loader::read_env(lookup)?;
        self.apply(overrides);
        if let Some(var) = last_var {
            self.source = ConfigSource::EnvironmentVariable(var);
        }
        Ok(self)
    }

    pub fn with_self_url(mut self, self_url: impl Into<String>) -> Self {
        self.config.self_url = self_url.into();
        self.source = ConfigSource::CommandLine;
        self
    }

    pub fn with_peers(mut self, peers: Vec<String>) -> Self {
        self.config.peers = peers;
        self.source = ConfigSource::CommandLine;
        self
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.config.replicas = replicas;
        self.source = ConfigSource::CommandLine;
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self.source = ConfigSource::CommandLine;
        self
    }

    pub fn with_cache_bytes(mut self, cache_bytes: u64) -> Self {
        self.config.cache_bytes = cache_bytes;
        self.source = ConfigSource::CommandLine;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.config.group = group.into();
        self.source = ConfigSource::CommandLine;
        self
    }

    pub fn with_api_addr(mut self, api_addr: SocketAddr) -> Self {
        self.config.api_addr = Some(api_addr);
        self.source = ConfigSource::CommandLine;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self.source = ConfigSource::CommandLine;
        self
    }

    /// Source of the last layer applied
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Validate and normalize the configuration
    pub fn build(self) -> Result<NodeConfig> {
        let mut config = self.config;

        config.self_url = normalize_url("self_url", &config.self_url)?;
        let mut peers = Vec::with_capacity(config.peers.len() + 1);
        for peer in &config.peers {
            let peer = normalize_url("peers", peer)?;
            if !peers.contains(&peer) {
                peers.push(peer);
            }
        }
        if !peers.contains(&config.self_url) {
            peers.push(config.self_url.clone());
        }
        config.peers = peers;

        if config.replicas == 0 {
            return Err(ConfigError::InvalidValue {
                field: "replicas",
                message: "must be greater than zero".to_string(),
            });
        }
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if config.base_path.len() < 2
            || !config.base_path.starts_with('/')
            || !config.base_path.ends_with('/')
        {
            return Err(ConfigError::InvalidValue {
                field: "base_path",
                message: format!(
                    "'{}' must start and end with '/' and name a prefix",
                    config.base_path
                ),
            });
        }
        if config.group.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "group",
                message: "must not be empty".to_string(),
            });
        }

        debug!(source = ?self.source, peers = config.peers.len(), "node configuration built");
        Ok(config)
    }

    fn apply(&mut self, layer: FileConfig) {
        let FileConfig {
            self_url,
            peers,
            replicas,
            base_path,
            cache_bytes,
            group,
            api_addr,
            request_timeout_secs,
        } = layer;

        if let Some(self_url) = self_url {
            self.config.self_url = self_url;
        }
        if let Some(peers) = peers {
            self.config.peers = peers;
        }
        if let Some(replicas) = replicas {
            self.config.replicas = replicas;
        }
        if let Some(base_path) = base_path {
            self.config.base_path = base_path;
        }
        if let Some(cache_bytes) = cache_bytes {
            self.config.cache_bytes = cache_bytes;
        }
        if let Some(group) = group {
            self.config.group = group;
        }
        if let Some(api_addr) = api_addr {
            self.config.api_addr = Some(api_addr);
        }
        if let Some(secs) = request_timeout_secs {
            self.config.request_timeout_secs = secs;
        }
    }
}

impl Default for NodeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field,
        message: format!("'{value}' is not a URL: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            field,
            message: format!("'{value}' must be an http(s) URL with a host"),
        });
    }
    Ok(url)
}

/// Peers are compared by string on the ring, so strip trailing slashes
fn normalize_url(field: &'static str, value: &str) -> Result<String> {
    parse_url(field, value)?;
    Ok(value.trim_end_matches('/').to_string())
}
