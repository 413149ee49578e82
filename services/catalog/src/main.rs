//! Catalog service binary.

use anyhow::Context;
use catalog_service::Config;
use rust_common::{init_tracing, shutdown_signal, TracingConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&TracingConfig::from_env("catalog-service"));

    let config = Config::from_env()?;
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, entries = catalog_service::catalog::entries().len(), "Catalog service listening");

    axum::serve(listener, catalog_service::router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Catalog service stopped");
    Ok(())
}
