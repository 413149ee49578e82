//! HTTP client for the catalog collaborator.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_common::{build_http_client, HttpConfig, PlatformError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// One catalog entry as served by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Entry id
    pub id: i64,
    /// Title
    pub name: String,
    /// Poster image path
    pub poster_path: String,
    /// Where the content can be watched
    pub external_url: String,
    /// Only paying users get the link
    pub is_paid_only: bool,
}

/// Catalog lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Catalog unreachable or answering with a server error
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// Catalog answered with something that is not a catalog document
    #[error("Catalog response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Read-only access to the catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be reached or decoded.
    async fn list(&self) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// One entry, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be reached or decoded.
    async fn get(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError>;
}

/// [`CatalogSource`] over the catalog service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    base_url: String,
    client: Client,
}

impl HttpCatalogClient {
    /// Create a client for the catalog at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PlatformError> {
        let config = HttpConfig::default()
            .with_timeout(timeout)
            .with_connect_timeout(timeout)
            .with_user_agent("cinema-gateway");
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(&config)?,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn list(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let url = format!("{}/catalog", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let entries: Vec<CatalogEntry> = response.json().await?;
        debug!(count = entries.len(), "Fetched catalog");
        Ok(entries)
    }

    async fn get(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError> {
        let url = format!("{}/catalog/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let entry = response.error_for_status()?.json().await?;
        Ok(Some(entry))
    }
}
