//! Pluggable configuration lookup.
//!
//! Services resolve runtime settings through the [`ConfigSource`] capability:
//! a single "resolve key to string, or report it absent" operation. Keys are
//! slash-separated paths such as `service/web/port`. Concrete adapters read
//! from command-line pairs, a JSON document, the Consul KV store, or the
//! process environment, and [`LayeredSource`] stacks them by precedence.

use crate::{build_http_client, HttpConfig, PlatformError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source that can resolve configuration keys.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Resolve `key` to its value.
    ///
    /// Returns `Ok(None)` when the source has no value for the key.
    ///
    /// # Errors
    ///
    /// Returns an error when the source itself cannot be consulted.
    async fn resolve(&self, key: &str) -> Result<Option<String>, PlatformError>;
}

/// Fixed key/value pairs, typically parsed from `--set key=value` flags.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    values: HashMap<String, String>,
}

impl StaticSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key/value pair.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Build from `key=value` assignments.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Config`] for an assignment without `=` or
    /// with an empty key.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, PlatformError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            match assignment.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    values.insert(key.trim().to_string(), value.to_string());
                }
                _ => {
                    return Err(PlatformError::config(format!(
                        "expected key=value, got '{assignment}'"
                    )))
                }
            }
        }
        Ok(Self { values })
    }
}

#[async_trait]
impl ConfigSource for StaticSource {
    fn name(&self) -> &str {
        "flags"
    }

    async fn resolve(&self, key: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Process environment.
///
/// `service/web/port` is looked up as `SERVICE_WEB_PORT`.
#[derive(Debug, Clone, Default)]
pub struct EnvSource;

impl EnvSource {
    /// Environment variable name for a key.
    #[must_use]
    pub fn var_name(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

#[async_trait]
impl ConfigSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    async fn resolve(&self, key: &str) -> Result<Option<String>, PlatformError> {
        Ok(std::env::var(Self::var_name(key)).ok())
    }
}

/// A JSON document loaded once at startup.
///
/// `a/b/c` walks nested objects. Strings are returned verbatim; numbers and
/// booleans are stringified; objects, arrays and nulls count as absent.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    document: Value,
}

impl JsonFileSource {
    /// Load a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Config`] when the file cannot be read or
    /// is not a JSON object.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlatformError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            PlatformError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_str_with_path(&content, path)
    }

    /// Parse a JSON document held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Config`] when the text is not a JSON object.
    pub fn from_json(content: &str) -> Result<Self, PlatformError> {
        Self::from_str_with_path(content, PathBuf::from("<inline>"))
    }

    fn from_str_with_path(content: &str, path: PathBuf) -> Result<Self, PlatformError> {
        let document: Value = serde_json::from_str(content).map_err(|e| {
            PlatformError::config(format!("invalid JSON in {}: {e}", path.display()))
        })?;
        if !document.is_object() {
            return Err(PlatformError::config(format!(
                "{} must contain a JSON object",
                path.display()
            )));
        }
        Ok(Self { path, document })
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let node = key
            .split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.document, |node, segment| node.get(segment))?;
        match node {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[async_trait]
impl ConfigSource for JsonFileSource {
    fn name(&self) -> &str {
        "json file"
    }

    async fn resolve(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let value = self.lookup(key);
        debug!(path = %self.path.display(), key, found = value.is_some(), "JSON config lookup");
        Ok(value)
    }
}

/// Consul key/value store, read through its HTTP API.
#[derive(Debug, Clone)]
pub struct ConsulKvSource {
    base_url: String,
    client: Client,
}

impl ConsulKvSource {
    /// Create a source for the agent at `address` (`host:port` or a full URL).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(address: &str) -> Result<Self, PlatformError> {
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };
        let client = build_http_client(&HttpConfig::default().with_user_agent("cinema-config"))?;
        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl ConfigSource for ConsulKvSource {
    fn name(&self) -> &str {
        "consul"
    }

    async fn resolve(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let url = format!("{}/v1/kv/{}?raw", self.base_url, key.trim_start_matches('/'));
        let response = self.client.get(&url).send().await.map_err(|e| {
            PlatformError::unavailable(format!("consul at {}: {e}", self.base_url))
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let value = response.text().await?;
                debug!(key, "Resolved key from consul");
                Ok(Some(value))
            }
            status => Err(PlatformError::unavailable(format!(
                "consul returned {status} for {key}"
            ))),
        }
    }
}

/// Ordered stack of sources; the first one holding a value wins.
#[derive(Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn ConfigSource>>,
}

impl LayeredSource {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-precedence layer.
    #[must_use]
    pub fn with_layer(mut self, source: impl ConfigSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[async_trait]
impl ConfigSource for LayeredSource {
    fn name(&self) -> &str {
        "layered config"
    }

    async fn resolve(&self, key: &str) -> Result<Option<String>, PlatformError> {
        for layer in &self.layers {
            if let Some(value) = layer.resolve(key).await? {
                debug!(key, source = layer.name(), "Resolved config key");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
