//! Error types for the gateway.

use rust_common::PlatformError;
use session_token::TokenError;
use thiserror::Error;

/// Startup configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key is absent from every source
    #[error("{0} is not configured")]
    Missing(String),

    /// A key is present but its value is unusable
    #[error("Invalid {key}: {reason}")]
    Invalid {
        /// Full config key
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// A config source could not be consulted
    #[error("Config lookup failed: {0}")]
    Source(String),
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<PlatformError> for ConfigError {
    fn from(err: PlatformError) -> Self {
        Self::Source(err.to_string())
    }
}

/// Startup and serving failures of the gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session codec could not be built
    #[error("Session codec error: {0}")]
    Token(#[from] TokenError),

    /// Collaborator client could not be built
    #[error("Client setup failed: {0}")]
    Client(#[from] PlatformError),

    /// Authentication service address is unusable
    #[error("Invalid auth service endpoint: {0}")]
    Endpoint(#[from] tonic::transport::Error),

    /// Page templates failed to compile
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Listener failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
