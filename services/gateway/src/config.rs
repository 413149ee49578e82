//! Gateway configuration.
//!
//! Resolved once at startup from a [`ConfigSource`]; every key lives under
//! `service/web/`. A missing port or session key, or any lookup failure, is
//! fatal: the gateway never serves traffic with unresolved configuration.

use crate::error::ConfigError;
use rust_common::ConfigSource;
use secrecy::{ExposeSecret, SecretString};
use session_token::MIN_KEY_LEN;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Key prefix shared by all gateway settings.
pub const SERVICE_PREFIX: &str = "service/web";

/// Default authentication service address.
pub const DEFAULT_AUTH_ADDR: &str = "http://127.0.0.1:1234";

/// Default catalog service address.
pub const DEFAULT_CATALOG_ADDR: &str = "http://127.0.0.1:8080";

/// Default bound on one Login RPC.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_millis(2000);

/// Gateway configuration.
#[derive(Debug)]
pub struct GatewayConfig {
    /// Address the HTTP listener binds to
    pub listen_addr: SocketAddr,
    /// Authentication service gRPC endpoint
    pub auth_addr: String,
    /// Catalog service base URL
    pub catalog_addr: String,
    /// Bound on one Login RPC
    pub auth_timeout: Duration,
    /// Key used to verify session tokens locally
    pub session_key: SecretString,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

/// Full key for a gateway setting.
#[must_use]
pub fn key(name: &str) -> String {
    format!("{SERVICE_PREFIX}/{name}")
}

impl GatewayConfig {
    /// Resolve every setting from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is absent, a value is invalid, or
    /// the source cannot be consulted.
    pub async fn load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let port = required(source, "port").await?;
        let listen_addr = parse_listen_addr(&port)?;

        let auth_addr = optional(source, "auth_addr")
            .await?
            .unwrap_or_else(|| DEFAULT_AUTH_ADDR.to_string());
        let auth_addr = normalize_url("auth_addr", &auth_addr)?;

        let catalog_addr = optional(source, "catalog_addr")
            .await?
            .unwrap_or_else(|| DEFAULT_CATALOG_ADDR.to_string());
        let catalog_addr = normalize_url("catalog_addr", &catalog_addr)?;

        let auth_timeout = match optional(source, "auth_timeout_ms").await? {
            Some(raw) => {
                let millis: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| ConfigError::invalid(key("auth_timeout_ms"), format!("{e}")))?;
                Duration::from_millis(millis)
            }
            None => DEFAULT_AUTH_TIMEOUT,
        };

        let session_key = SecretString::from(required(source, "session_key").await?);

        let cookie_secure = match optional(source, "cookie_secure").await? {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(key("cookie_secure"), format!("{e}")))?,
            None => false,
        };

        let config = Self {
            listen_addr,
            auth_addr,
            catalog_addr,
            auth_timeout,
            session_key,
            cookie_secure,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero RPC timeout or a short session key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_timeout.is_zero() {
            return Err(ConfigError::invalid(key("auth_timeout_ms"), "must be greater than 0"));
        }
        let key_len = self.session_key.expose_secret().len();
        if key_len < MIN_KEY_LEN {
            return Err(ConfigError::invalid(
                key("session_key"),
                format!("must be at least {MIN_KEY_LEN} bytes, got {key_len}"),
            ));
        }
        Ok(())
    }
}

async fn optional(source: &dyn ConfigSource, name: &str) -> Result<Option<String>, ConfigError> {
    let value = source.resolve(&key(name)).await?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

async fn required(source: &dyn ConfigSource, name: &str) -> Result<String, ConfigError> {
    optional(source, name)
        .await?
        .ok_or_else(|| ConfigError::Missing(key(name)))
}

/// Parse the listening port setting.
///
/// Accepts `8000`, `:8000` (all interfaces) or `host:port`, where host is an
/// IP address or `localhost`.
///
/// # Errors
///
/// Returns an error if the value is not one of those forms.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    let raw = raw.trim();
    let invalid = |reason: &str| ConfigError::invalid(key("port"), format!("'{raw}': {reason}"));

    let (host, port) = match raw.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => ("", raw),
    };
    let port: u16 = port.parse().map_err(|_| invalid("port must be 0-65535"))?;

    let ip = match host.trim_start_matches('[').trim_end_matches(']') {
        "" => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        "localhost" => IpAddr::V4(Ipv4Addr::LOCALHOST),
        other => other.parse().map_err(|_| invalid("host must be an IP address"))?,
    };
    Ok(SocketAddr::new(ip, port))
}

/// Ensure an address is an absolute http(s) URL, adding `http://` to bare
/// `host:port` values.
fn normalize_url(name: &str, raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim().trim_end_matches('/');
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let url = url::Url::parse(&candidate).map_err(|e| ConfigError::invalid(key(name), format!("{e}")))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(candidate),
        _ => Err(ConfigError::invalid(key(name), "expected an http(s) address")),
    }
}
