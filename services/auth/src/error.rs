//! Error types for the authentication service.

use crate::directory::DirectoryError;
use session_token::TokenError;
use thiserror::Error;

/// Configuration errors raised while reading the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed or is out of range
    #[error("Invalid {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Startup and serving failures of the authentication service.
///
/// Login verdicts are not errors; they travel in
/// [`LoginOutcome`](crate::login::LoginOutcome).
#[derive(Error, Debug)]
pub enum AuthServiceError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential directory could not be built
    #[error("Credential directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Token codec could not be built
    #[error("Token codec error: {0}")]
    Token(#[from] TokenError),

    /// Listener could not be bound or configured
    #[error("Bind error: {0}")]
    Bind(String),

    /// gRPC transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::Missing("SESSION_SIGNING_KEY").to_string(),
            "SESSION_SIGNING_KEY must be set"
        );
        assert_eq!(
            ConfigError::invalid("PORT", "not a number").to_string(),
            "Invalid PORT: not a number"
        );
    }

    #[test]
    fn test_wraps_token_error() {
        let err: AuthServiceError = TokenError::WeakKey { min: 32, actual: 3 }.into();
        assert!(err.to_string().starts_with("Token codec error"));
    }
}
