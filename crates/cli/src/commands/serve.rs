use super::ServeArgs;
use crate::sample::SlowDb;
use eyre::WrapErr;
use peercache_cache::{ByteView, Registry};
use peercache_config::{NodeConfig, NodeConfigBuilder};
use peercache_transport::{api_router, serve, HttpPool, PoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

pub async fn execute(args: ServeArgs) -> eyre::Result<()> {
    let db = match &args.data {
        Some(path) => SlowDb::from_file(path)?,
        None => SlowDb::sample(),
    };
    let config = node_config(args, |name| std::env::var(name).ok())?;
    info!(
        self_url = %config.self_url,
        peers = ?config.peers,
        group = %config.group,
        rows = db.len(),
        "starting node"
    );

    let registry = Registry::global();
    let group = registry
        .group(config.group.as_str())
        .cache_bytes(config.cache_bytes)
        .getter(db)
        .on_evicted(|key: &str, value: &ByteView| {
            debug!(key, bytes = value.len(), "evicted");
        })
        .register()?;

    let options = PoolOptions {
        base_path: config.base_path.clone(),
        replicas: config.replicas,
        request_timeout: config.request_timeout(),
    };
    let pool = Arc::new(HttpPool::new(config.self_url.clone(), options, Handle::current()));
    pool.set(&config.peers)?;
    group.register_peers(pool.clone())?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let shutdown = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.changed().await;
    };

    let listen_addr = config.listen_addr()?;
    let listener = TcpListener::bind(listen_addr)
        .await
        .wrap_err_with(|| format!("failed to bind peer listener on {listen_addr}"))?;
    let peer_server = tokio::spawn(serve(
        listener,
        pool.router(Arc::clone(&registry)),
        shutdown(stop_rx.clone()),
    ));

    let api_server = match config.api_addr {
        Some(api_addr) => {
            let listener = TcpListener::bind(api_addr)
                .await
                .wrap_err_with(|| format!("failed to bind api listener on {api_addr}"))?;
            info!(%api_addr, "api server enabled");
            Some(tokio::spawn(serve(
                listener,
                api_router(Arc::clone(&group)),
                shutdown(stop_rx.clone()),
            )))
        }
        None => None,
    };

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    let _ = stop_tx.send(true);

    peer_server.await??;
    if let Some(api_server) = api_server {
        api_server.await??;
    }

    let stats = group.stats();
    info!(
        gets = stats.gets,
        hit_rate = stats.hit_rate(),
        peer_loads = stats.peer_loads,
        local_loads = stats.local_loads,
        "group stats"
    );
    Ok(())
}

/// Defaults, then the config file, then `PEERCACHE_*` from `env`, then flags
fn node_config<F>(args: ServeArgs, env: F) -> eyre::Result<NodeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = NodeConfigBuilder::new();
    if let Some(path) = &args.config {
        builder = builder.with_file(path)?;
    }
    builder = builder.with_env_from(env)?;

    if let Some(addr) = args.addr {
        builder = builder.with_self_url(addr);
    }
    if !args.peers.is_empty() {
        builder = builder.with_peers(args.peers);
    }
    if let Some(api) = args.api {
        builder = builder.with_api_addr(api);
    }
    if let Some(cache_bytes) = args.cache_bytes {
        builder = builder.with_cache_bytes(cache_bytes);
    }
    if let Some(group) = args.group {
        builder = builder.with_group(group);
    }

    Ok(builder.build()?)
}
