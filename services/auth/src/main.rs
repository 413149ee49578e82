//! Authentication service binary.

use anyhow::Context;
use auth_service::Config;
use rust_common::{init_tracing, shutdown_signal, TracingConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&TracingConfig::from_env("auth-service"));

    info!("Starting auth service");

    let config = Config::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    auth_service::serve(&config, listener, shutdown_signal()).await?;
    Ok(())
}
