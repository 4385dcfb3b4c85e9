//! Shared test helpers for integration tests.

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use folio_api::{AppState, build_app};
use folio_core::config::AppConfig;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Configuration with test credentials and no login delay.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.environment = "test".to_string();
    config.auth.jwt_secret = Some("integration-test-secret-0123456789abcdef".to_string());
    config.auth.admin_email = Some(ADMIN_EMAIL.to_string());
    config.auth.admin_password = Some(ADMIN_PASSWORD.to_string());
    config.auth.login_delay_min_ms = 0;
    config.auth.login_delay_max_ms = 0;
    config
}

/// Test application context
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// Shared state, for reaching behind the HTTP surface
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config).expect("Failed to build app state");
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Serves the app on an ephemeral local port and returns its base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        let app = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });
        format!("http://{addr}")
    }

    /// Login and return `(token, session id)`.
    pub async fn login(&self) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/admin/login",
                Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "Login failed: {:?}", response.body);

        let token = response.body["token"]
            .as_str()
            .expect("No token in login response")
            .to_string();
        let session_id = response.body["admin"]["sessionId"]
            .as_str()
            .expect("No session id in login response")
            .to_string();
        (token, session_id)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, token, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.send(None, method, path, body, token, headers).await
    }

    /// Make a request as if it arrived over a socket from `peer`.
    pub async fn request_from(
        &self,
        peer: [u8; 4],
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let peer = SocketAddr::from((peer, 40_000));
        self.send(Some(peer), method, path, body, None, headers).await
    }

    async fn send(
        &self,
        peer: Option<SocketAddr>,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let mut req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        if let Some(peer) = peer {
            req.extensions_mut().insert(ConnectInfo(peer));
        }

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `code` field of an error envelope.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}
