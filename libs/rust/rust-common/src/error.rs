//! Centralized error types for the shared platform library.
//!
//! Collaborator and configuration failures surface as [`PlatformError`], so
//! callers can tell an unreachable source apart from bad configuration.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP client could not be built or a request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlatformError {
    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a configuration error with the given message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlatformError::unavailable("consul at http://127.0.0.1:8500");
        assert_eq!(
            err.to_string(),
            "Service unavailable: consul at http://127.0.0.1:8500"
        );

        let err = PlatformError::config("service/web/port is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: service/web/port is not set"
        );
    }
}
