//! HTTP-backed peer getter

use crate::errors::{Result, TransportError};
use peercache_cache::{FetchRequest, FetchResponse, PeerError, PeerGetter};
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

/// Fetches keys from one peer over `GET <peer><base_path><group>/<key>`.
///
/// [`PeerGetter::get`] blocks on the runtime handle, so it must run on a
/// thread the runtime does not drive, such as a `spawn_blocking` task.
pub struct HttpGetter {
    addr: String,
    base_url: Url,
    client: reqwest::Client,
    runtime: Handle,
}

impl HttpGetter {
    pub fn new(peer_url: &str, base_path: &str, timeout: Duration, runtime: Handle) -> Result<Self> {
        let raw = format!("{}{}", peer_url.trim_end_matches('/'), base_path);
        let base_url = Url::parse(&raw).map_err(|source| TransportError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl {
                url: raw,
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            addr: peer_url.to_string(),
            base_url,
            client,
            runtime,
        })
    }

    /// Request URL for `request`, with group and key percent-encoded
    pub fn url_for(&self, request: &FetchRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&request.group)
                .push(&request.key);
        }
        url
    }

    /// Async form of [`PeerGetter::get`] for callers already on the runtime
    pub async fn fetch(
        &self,
        request: &FetchRequest,
    ) -> std::result::Result<FetchResponse, PeerError> {
        let url = self.url_for(request);
        debug!(peer = %self.addr, url = %url, "fetching from peer");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PeerError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PeerError::GroupNotFound(request.group.clone()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PeerError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PeerError::Network(e.to_string()))?;
        Ok(FetchResponse {
            value: body.to_vec(),
        })
    }
}

impl PeerGetter for HttpGetter {
    fn get(&self, request: &FetchRequest) -> std::result::Result<FetchResponse, PeerError> {
        self.runtime.block_on(self.fetch(request))
    }

    fn addr(&self) -> &str {
        &self.addr
    }
}
