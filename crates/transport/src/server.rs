//! HTTP server side of a node: the peer endpoint and the optional public API

use crate::errors::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use peercache_cache::{CacheError, Group, Registry};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Routes `GET {base_path}{group}/{key}` to the groups in `registry`.
///
/// `base_path` must start and end with `/`.
pub fn peer_router(registry: Arc<Registry>, base_path: &str) -> Router {
    Router::new()
        .route(&format!("{base_path}:group/*key"), get(peer_handler))
        .route(&format!("{base_path}:group/"), get(empty_key_handler))
        .with_state(registry)
}

async fn peer_handler(
    State(registry): State<Arc<Registry>>,
    Path((group_name, key)): Path<(String, String)>,
) -> Response {
    debug!(group = %group_name, key = %key, "peer request");

    let Some(group) = registry.get_group(&group_name) else {
        return (
            StatusCode::NOT_FOUND,
            format!("no such group: {group_name}"),
        )
            .into_response();
    };

    lookup(group, key).await
}

async fn empty_key_handler() -> Response {
    (StatusCode::BAD_REQUEST, CacheError::EmptyKey.to_string()).into_response()
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    key: String,
}

/// Public lookup endpoint `GET /api?key=<key>` for a single group
pub fn api_router(group: Arc<Group>) -> Router {
    Router::new()
        .route("/api", get(api_handler))
        .with_state(group)
}

async fn api_handler(State(group): State<Arc<Group>>, Query(query): Query<ApiQuery>) -> Response {
    lookup(group, query.key).await
}

/// Group lookups may block on a loader or a remote peer, so they run off the
/// async workers.
async fn lookup(group: Arc<Group>, key: String) -> Response {
    let result = tokio::task::spawn_blocking(move || group.get(&key)).await;

    match result {
        Ok(Ok(view)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            Body::from(view.into_bytes()),
        )
            .into_response(),
        Ok(Err(err @ CacheError::EmptyKey)) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Ok(Err(err)) => {
            warn!(error = %err, "lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        Err(join_err) => {
            error!(error = %join_err, "lookup task panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!(%addr, "server stopped");
    Ok(())
}
