//! omnisearch server binary.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use omnisearch::cache::MemoryCache;
use omnisearch::config::ServiceConfig;
use omnisearch::server::{AppState, OmniBackend, OmniServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    let host = config.host.clone();
    let port = config.port;

    let cache = Arc::new(MemoryCache::new());
    let backend = Arc::new(OmniBackend::new(config.clone()).context("backend setup failed")?);
    let state = AppState::new(config, cache, backend);

    let server = OmniServer::start(state, &host, port)
        .await
        .context("server startup failed")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    server.shutdown();

    Ok(())
}
