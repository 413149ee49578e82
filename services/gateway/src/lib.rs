//! Gateway service library.
//!
//! Serves the browser-facing pages, resolves the session from the `jwt`
//! cookie on every request, and delegates credential checks to the
//! authentication service over gRPC.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth_client;
pub mod catalog_client;
pub mod cli;
pub mod config;
pub mod error;
pub mod pages;
pub mod routes;
pub mod session;

pub use auth_client::{AuthClientError, Authenticator, GrpcAuthenticator, LoginVerdict};
pub use catalog_client::{CatalogEntry, CatalogError, CatalogSource, HttpCatalogClient};
pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError};
pub use pages::Pages;
pub use routes::{router, AppState};
pub use session::{Session, SessionResolver, SESSION_COOKIE};

use axum::Router;
use session_token::TokenCodec;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Bound on one catalog request.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(2);

/// Wire the production collaborators into a router.
///
/// Nothing is dialed here; the auth channel connects on first use.
///
/// # Errors
///
/// Returns an error if the session key is unusable, a client cannot be
/// built, or a page template does not compile.
pub fn build_app(config: &GatewayConfig) -> Result<Router, GatewayError> {
    // Only the verification side is used; the lifetime comes from each token.
    let codec = TokenCodec::new(&config.session_key, session_token::DEFAULT_TTL)?;
    let auth = GrpcAuthenticator::new(&config.auth_addr, config.auth_timeout)?;
    let catalog = HttpCatalogClient::new(&config.catalog_addr, CATALOG_TIMEOUT)?;
    let pages = Pages::new()?;

    let state = AppState::new(
        SessionResolver::new(Arc::new(codec)),
        Arc::new(auth),
        Arc::new(catalog),
        Arc::new(pages),
        config.cookie_secure,
    );
    Ok(router(state))
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), GatewayError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "Gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Gateway stopped");
    Ok(())
}
