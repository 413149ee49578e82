//! Configuration for the authentication service.
//!
//! Loaded from environment variables (and a `.env` file, if present) and
//! validated at startup. A missing or short signing key is fatal.

use crate::error::ConfigError;
use secrecy::{ExposeSecret, SecretString};
use session_token::{DEFAULT_TTL, MIN_KEY_LEN};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Authentication service configuration.
#[derive(Debug)]
pub struct Config {
    // Server settings
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    // Session tokens
    /// Shared HS256 signing key
    pub signing_key: SecretString,
    /// Lifetime of issued tokens
    pub session_ttl: Duration,

    // Login policy
    /// Tell callers whether the identifier or the secret was wrong
    pub disclose_failure_reason: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&var, "PORT", 1234)?;

        let signing_key = var("SESSION_SIGNING_KEY")
            .filter(|key| !key.is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("SESSION_SIGNING_KEY"))?;
        let session_ttl =
            Duration::from_secs(parse_var(&var, "SESSION_TTL_SECS", DEFAULT_TTL.as_secs())?);

        let disclose_failure_reason = parse_var(&var, "DISCLOSE_LOGIN_FAILURE_REASON", false)?;

        let config = Self {
            host,
            port,
            signing_key,
            session_ttl,
            disclose_failure_reason,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error for a short signing key or a zero token lifetime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key_len = self.signing_key.expose_secret().len();
        if key_len < MIN_KEY_LEN {
            return Err(ConfigError::invalid(
                "SESSION_SIGNING_KEY",
                format!("must be at least {MIN_KEY_LEN} bytes, got {key_len}"),
            ));
        }
        if self.session_ttl.is_zero() {
            return Err(ConfigError::invalid("SESSION_TTL_SECS", "must be greater than 0"));
        }
        Ok(())
    }

    /// Address the gRPC server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOST` and `PORT` do not form a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::invalid("HOST", format!("{e}")))
    }
}

/// Parse a variable, falling back to `default` when unset.
fn parse_var<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(name, format!("{e}"))),
        None => Ok(default),
    }
}
