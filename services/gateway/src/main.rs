//! Gateway service binary.

use anyhow::Context;
use clap::Parser;
use gateway_service::cli::{self, Args};
use gateway_service::GatewayConfig;
use rust_common::{init_tracing, shutdown_signal, TracingConfig};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before parsing so `.env` also feeds clap's env fallbacks.
    let env_loaded = cli::load_env_file(Path::new(cli::ENV_FILE)).context("reading .env")?;
    let args = Args::parse();
    init_tracing(&TracingConfig::from_env("gateway-service"));

    info!(env_file = env_loaded, "Starting gateway");

    let source = args.config_source().context("config sources")?;
    let config = GatewayConfig::load(&source).await.map_err(|e| {
        error!(error = %e, "Configuration could not be resolved");
        e
    })?;

    let app = gateway_service::build_app(&config)?;
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    gateway_service::serve(listener, app, shutdown_signal()).await?;
    Ok(())
}
