//! Authentication service library.
//!
//! Verifies credentials against a read-only directory and issues signed
//! session tokens through the `user.v1.UserService/Login` RPC.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod directory;
pub mod error;
pub mod grpc;
pub mod login;

pub use config::Config;
pub use directory::{CredentialDirectory, DirectoryError, IdentityRecord};
pub use error::{AuthServiceError, ConfigError};
pub use grpc::UserServiceImpl;
pub use login::{Authenticator, LoginFailure, LoginOutcome, TokenIssuer};

use session_token::TokenCodec;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tonic::transport::server::TcpIncoming;
use tonic::transport::Server;
use tracing::info;

/// Build the Login handler from configuration and the built-in directory.
///
/// # Errors
///
/// Returns an error if the directory or the token codec cannot be built.
pub fn build_service(config: &Config) -> Result<UserServiceImpl, AuthServiceError> {
    let directory = Arc::new(CredentialDirectory::seeded()?);
    let codec = Arc::new(TokenCodec::new(&config.signing_key, config.session_ttl)?);
    info!(
        principals = directory.len(),
        ttl_secs = config.session_ttl.as_secs(),
        "Credential directory loaded"
    );
    Ok(UserServiceImpl::new(
        Authenticator::new(directory, codec),
        config.disclose_failure_reason,
    ))
}

/// Serve the Login RPC on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the service cannot be built or the transport fails.
pub async fn serve<F>(config: &Config, listener: TcpListener, shutdown: F) -> Result<(), AuthServiceError>
where
    F: Future<Output = ()> + Send,
{
    let service = build_service(config)?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| AuthServiceError::Bind(e.to_string()))?;
    let incoming = TcpIncoming::from_listener(listener, true, None)
        .map_err(|e| AuthServiceError::Bind(e.to_string()))?;

    info!(addr = %local_addr, "Auth service listening");

    Server::builder()
        .add_service(service.into_server())
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await?;

    info!("Auth service stopped");
    Ok(())
}
