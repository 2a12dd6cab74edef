//! Reading configuration layers from files and the environment

use crate::errors::{ConfigError, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

pub const ENV_SELF_URL: &str = "PEERCACHE_SELF_URL";
/// Comma separated peer URLs
pub const ENV_PEERS: &str = "PEERCACHE_PEERS";
pub const ENV_REPLICAS: &str = "PEERCACHE_REPLICAS";
pub const ENV_BASE_PATH: &str = "PEERCACHE_BASE_PATH";
pub const ENV_CACHE_BYTES: &str = "PEERCACHE_CACHE_BYTES";
pub const ENV_GROUP: &str = "PEERCACHE_GROUP";
pub const ENV_API_ADDR: &str = "PEERCACHE_API_ADDR";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PEERCACHE_REQUEST_TIMEOUT_SECS";

/// One layer of configuration; absent fields leave earlier layers untouched
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub self_url: Option<String>,
    pub peers: Option<Vec<String>>,
    pub replicas: Option<usize>,
    pub base_path: Option<String>,
    pub cache_bytes: Option<u64>,
    pub group: Option<String>,
    pub api_addr: Option<SocketAddr>,
    pub request_timeout_secs: Option<u64>,
}

pub(crate) fn read_file(path: &Path) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect overrides from `lookup`, returning the last variable that was set
pub(crate) fn read_env<F>(lookup: F) -> Result<(FileConfig, Option<String>)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut layer = FileConfig::default();
    let mut last = None;
    let mut var = |name: &'static str| {
        let value = lookup(name).filter(|v| !v.trim().is_empty());
        if value.is_some() {
            last = Some(name.to_string());
        }
        value
    };

    layer.self_url = var(ENV_SELF_URL);
    layer.peers = var(ENV_PEERS).map(|peers| {
        peers
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    });
    layer.replicas = var(ENV_REPLICAS).map(|v| parse_number(ENV_REPLICAS, &v)).transpose()?;
    layer.base_path = var(ENV_BASE_PATH);
    layer.cache_bytes = var(ENV_CACHE_BYTES)
        .map(|v| parse_number(ENV_CACHE_BYTES, &v))
        .transpose()?;
    layer.group = var(ENV_GROUP);
    layer.api_addr = var(ENV_API_ADDR)
        .map(|v| {
            v.trim().parse().map_err(|e| ConfigError::InvalidValue {
                field: "api_addr",
                message: format!("{ENV_API_ADDR}='{v}': {e}"),
            })
        })
        .transpose()?;
    layer.request_timeout_secs = var(ENV_REQUEST_TIMEOUT_SECS)
        .map(|v| parse_number(ENV_REQUEST_TIMEOUT_SECS, &v))
        .transpose()?;

    Ok((layer, last))
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| ConfigError::InvalidValue {
        field: name,
        message: format!("'{value}': {e}"),
    })
}
