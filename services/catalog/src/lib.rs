//! Catalog service library.
//!
//! Serves a fixed, read-only list of titles as JSON.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;

pub use catalog::CatalogEntry;
pub use config::{Config, ConfigError};

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// Build the catalog router.
pub fn router() -> Router {
    Router::new()
        .route("/catalog", get(list))
        .route("/catalog/:id", get(entry))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
}

async fn list() -> Json<&'static [CatalogEntry]> {
    Json(catalog::entries())
}

async fn entry(Path(id): Path<i64>) -> Response {
    match catalog::find(id) {
        Some(entry) => Json(entry).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list() {
        let (status, body) = get_json("/catalog").await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["posterPath"], "/static/posters/fightclub.jpg");
        assert_eq!(entries[1]["isPaidOnly"], false);
        assert_eq!(entries[2]["externalUrl"], "https://youtu.be/s7EdQ4FqbhY");
    }

    #[tokio::test]
    async fn test_entry() {
        let (status, body) = get_json("/catalog/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "The Godfather");
    }

    #[tokio::test]
    async fn test_unknown_entry_is_not_found() {
        for uri in ["/catalog/3", "/catalog/-1"] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({"error": "not found"}));
        }
    }
}
