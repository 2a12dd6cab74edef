//! Slow backing store used by `peercache serve`

use eyre::WrapErr;
use peercache_cache::{BoxError, Getter};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Key/value table standing in for a database
#[derive(Debug, Clone)]
pub struct SlowDb {
    rows: HashMap<String, String>,
}

impl SlowDb {
    /// The built-in score table
    pub fn sample() -> Self {
        let rows = [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { rows }
    }

    /// Load a flat JSON object of string values
    pub fn from_file(path: &Path) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let rows = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("{} must be a JSON object of strings", path.display()))?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl Getter for SlowDb {
    fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        info!(key, "[SlowDB] search key");
        match self.rows.get(key) {
            Some(value) => Ok(value.as_bytes().to_vec()),
            None => Err(format!("{key} not exist").into()),
        }
    }
}
