//! HTTP routes of the gateway.

use crate::auth_client::{Authenticator, LoginVerdict};
use crate::catalog_client::{CatalogError, CatalogSource};
use crate::pages::{self, Pages};
use crate::session::{clear_session_cookie, session_cookie, SessionResolver};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Shown when the Login RPC cannot be completed.
pub const AUTH_UNAVAILABLE: &str = "Authentication service unavailable";

/// Shown when a login succeeded remotely but cannot be completed here.
pub const INTERNAL_ERROR: &str = "Internal service error";

/// Upper bound on handling one request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    sessions: SessionResolver,
    auth: Arc<dyn Authenticator>,
    catalog: Arc<dyn CatalogSource>,
    pages: Arc<Pages>,
    cookie_secure: bool,
}

impl AppState {
    /// Assemble handler state from its collaborators.
    pub fn new(
        sessions: SessionResolver,
        auth: Arc<dyn Authenticator>,
        catalog: Arc<dyn CatalogSource>,
        pages: Arc<Pages>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            sessions,
            auth,
            catalog,
            pages,
            cookie_secure,
        }
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
        .route("/catalog", get(catalog_list))
        .route("/catalog/:id", get(catalog_entry))
        .route("/healthz", get(healthz))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                correlation_id = %Uuid::new_v4(),
            )
        }))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    pwd: String,
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers);
    let entries = match state.catalog.list().await {
        Ok(entries) => Some(entries),
        Err(e) => {
            warn!(error = %e, "Catalog fetch failed, rendering without entries");
            None
        }
    };
    page(StatusCode::OK, state.pages.catalog(&session, entries.as_deref()))
}

async fn login_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers);
    page(StatusCode::OK, state.pages.login(session.user(), None))
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let verdict = match state.auth.login(&form.email, &form.pwd).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(identifier = %form.email, error = %e, "Login could not reach the auth service");
            return page(
                StatusCode::SERVICE_UNAVAILABLE,
                state.pages.login(None, Some(AUTH_UNAVAILABLE)),
            );
        }
    };

    let token = match verdict {
        LoginVerdict::Granted { token } => token,
        LoginVerdict::Refused { message } => {
            info!(identifier = %form.email, "Login refused");
            return page(StatusCode::OK, state.pages.login(None, Some(message.as_str())));
        }
    };

    let verified = match state.sessions.verify_issued(&token) {
        Ok(verified) => verified,
        Err(e) => {
            error!(identifier = %form.email, error = %e, "Issued token does not verify with the gateway key");
            return internal_error(&state.pages);
        }
    };
    let Some(cookie) = session_cookie(&token, verified.max_age, state.cookie_secure) else {
        error!(identifier = %form.email, "Issued token is not a valid cookie value");
        return internal_error(&state.pages);
    };

    info!(user_id = verified.payload.id, "Login succeeded");
    let mut response = page(StatusCode::OK, state.pages.login(Some(&verified.payload), None));
    if response.status() == StatusCode::OK {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

async fn logout() -> Response {
    (
        StatusCode::FOUND,
        [
            (SET_COOKIE, clear_session_cookie()),
            (LOCATION, HeaderValue::from_static("/login")),
        ],
    )
        .into_response()
}

async fn catalog_list(State(state): State<AppState>) -> Response {
    match state.catalog.list().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => catalog_unavailable(&e),
    }
}

async fn catalog_entry(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.catalog.get(id).await {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response(),
        Err(e) => catalog_unavailable(&e),
    }
}

fn catalog_unavailable(err: &CatalogError) -> Response {
    warn!(error = %err, "Catalog request failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"error": pages::CATALOG_UNAVAILABLE})),
    )
        .into_response()
}

fn internal_error(pages: &Pages) -> Response {
    page(
        StatusCode::INTERNAL_SERVER_ERROR,
        pages.login(None, Some(INTERNAL_ERROR)),
    )
}

fn page(status: StatusCode, rendered: Result<String, tera::Error>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Page rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}
