//! End-to-end login flow: gateway router -> real gRPC auth service.

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use gateway_service::{
    router, AppState, AuthClientError, Authenticator, GrpcAuthenticator, HttpCatalogClient,
    LoginVerdict, Pages, SessionResolver,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{test_codec, TEST_SIGNING_KEY};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct AuthServer {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
}

impl AuthServer {
    async fn start() -> Self {
        Self::start_on(TcpListener::bind("127.0.0.1:0").await.unwrap())
    }

    fn start_on(listener: TcpListener) -> Self {
        let addr = listener.local_addr().unwrap();
        let config = auth_service::Config::from_vars(|name| match name {
            "SESSION_SIGNING_KEY" => Some(TEST_SIGNING_KEY.to_string()),
            _ => None,
        })
        .unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        tokio::spawn(async move {
            auth_service::serve(&config, listener, async {
                stopped.await.ok();
            })
            .await
        });
        Self {
            addr,
            stop: Some(stop),
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for AuthServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn catalog() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 0,
                "name": "Fight Club",
                "posterPath": "/static/posters/fightclub.jpg",
                "externalUrl": "https://youtu.be/qtRKdVHc-cE",
                "isPaidOnly": true
            }
        ])))
        .mount(&server)
        .await;
    server
}

fn gateway(auth: GrpcAuthenticator, catalog: &MockServer) -> Router {
    router(AppState::new(
        SessionResolver::new(Arc::new(test_codec())),
        Arc::new(auth),
        Arc::new(HttpCatalogClient::new(&catalog.uri(), Duration::from_secs(2)).unwrap()),
        Arc::new(Pages::new().unwrap()),
        false,
    ))
}

async fn wait_until_serving(auth: &GrpcAuthenticator) {
    for _ in 0..50 {
        if auth.login("ready@mail.ru", "x").await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("auth service did not come up");
}

fn login_request(email: &str, pwd: &str) -> Request<Body> {
    Request::post("/login")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("email={email}&pwd={pwd}")))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn session_cookie(response: &Response) -> Option<String> {
    let value = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(str::to_string)
}

#[tokio::test]
async fn test_login_then_browse_then_logout() {
    let server = AuthServer::start().await;
    let catalog = catalog().await;
    // The breaker must not trip while the server is still coming up.
    let auth = GrpcAuthenticator::with_breaker(
        &server.url(),
        Duration::from_secs(2),
        rust_common::CircuitBreakerConfig::default().with_failure_threshold(1000),
    )
    .unwrap();
    wait_until_serving(&auth).await;
    let app = gateway(auth, &catalog);

    let response = app.clone().oneshot(login_request("bob%40mail.ru", "god")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("session cookie");
    assert!(cookie.starts_with("jwt="));
    assert!(body_text(response).await.contains("Hello, Bob!"));

    let page = app
        .clone()
        .oneshot(Request::get("/").header(COOKIE, &cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let page = body_text(page).await;
    assert!(page.contains("qtRKdVHc-cE"), "paid user sees the paid link");

    let logout = app
        .oneshot(Request::post("/logout").header(COOKIE, &cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::FOUND);
    assert_eq!(session_cookie(&logout).as_deref(), Some("jwt="));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user() {
    let server = AuthServer::start().await;
    let catalog = catalog().await;
    let auth = GrpcAuthenticator::new(&server.url(), Duration::from_secs(2)).unwrap();
    wait_until_serving(&auth).await;

    assert_eq!(
        auth.login("bob@mail.ru", "wrong").await.unwrap(),
        LoginVerdict::Refused {
            message: "Invalid email or password".to_string()
        }
    );

    let app = gateway(auth, &catalog);
    for (email, pwd) in [("bob%40mail.ru", "wrong"), ("nobody%40mail.ru", "x")] {
        let response = app.clone().oneshot(login_request(email, pwd)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("Invalid email or password"));
    }
}

#[tokio::test]
async fn test_auth_service_down_is_unavailable() {
    // Reserve a port, then free it so nothing is listening there.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let catalog = catalog().await;
    let auth = GrpcAuthenticator::new(&format!("http://{addr}"), Duration::from_millis(500)).unwrap();

    let direct = auth.login("bob@mail.ru", "god").await;
    assert!(
        matches!(direct, Err(AuthClientError::Unavailable(_) | AuthClientError::Timeout(_))),
        "got {direct:?}"
    );

    let response = gateway(auth, &catalog)
        .oneshot(login_request("bob%40mail.ru", "god"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let body = body_text(response).await;
    assert!(body.contains("Authentication service unavailable"));
    assert!(!body.contains("Invalid email or password"));
}

#[tokio::test]
async fn test_cancelled_half_open_login_does_not_lock_out_recovery() {
    // Accepts connections at the kernel level but never answers.
    let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap();
    let auth = GrpcAuthenticator::with_breaker(
        &format!("http://{addr}"),
        Duration::from_millis(200),
        rust_common::CircuitBreakerConfig::default()
            .with_failure_threshold(1)
            .with_open_duration(Duration::from_millis(50)),
    )
    .unwrap();

    assert!(auth.login("bob@mail.ru", "god").await.is_err());
    tokio::time::sleep(Duration::from_millis(60)).await;

    // The browser goes away while the half-open login is in flight.
    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), auth.login("bob@mail.ru", "god")).await;
    assert!(abandoned.is_err());

    drop(silent);
    let _server = AuthServer::start_on(TcpListener::bind(addr).await.unwrap());

    let mut last = None;
    for _ in 0..40 {
        match auth.login("bob@mail.ru", "god").await {
            Ok(LoginVerdict::Granted { .. }) => return,
            other => last = Some(other),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("login never recovered: {last:?}");
}
