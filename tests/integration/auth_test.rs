//! Integration tests for login, token checks, refresh, and logout.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use folio_auth::{Role, SessionId, TokenSubject};

use crate::helpers::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp, test_config};

#[tokio::test]
async fn test_login_then_verify_returns_same_identity() {
    let app = TestApp::new();

    let login = app
        .request(
            "POST",
            "/admin/login",
            Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["expiresIn"], "24h");
    assert_eq!(login.body["admin"]["role"], "admin");
    let token = login.body["token"].as_str().unwrap();

    let verify = app.request("GET", "/admin/verify", None, Some(token)).await;
    assert_eq!(verify.status, StatusCode::OK);
    assert_eq!(verify.body["admin"]["id"], login.body["admin"]["id"]);
    assert_eq!(verify.body["admin"]["sessionId"], login.body["admin"]["sessionId"]);
    assert_eq!(verify.body["sessionValid"], true);
    assert_eq!(verify.body["environment"], "test");
    assert_eq!(
        verify.body["permissions"],
        json!(["read:projects", "write:projects", "delete:projects"])
    );
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/admin/login",
            Some(json!({ "email": ADMIN_EMAIL, "password": "not the password" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "INVALID_CREDENTIALS");
    assert!(response.body["requestId"].is_string());
    assert!(response.body.get("token").is_none());
}

#[tokio::test]
async fn test_login_rejects_invalid_input() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/admin/login",
            Some(json!({ "email": "not-an-email", "password": "short" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "VALIDATION_ERROR");
    assert!(response.body["details"]["email"].is_array());
    assert!(response.body["details"]["password"].is_array());
}

fn credentials(password: &str) -> Option<serde_json::Value> {
    Some(json!({ "email": ADMIN_EMAIL, "password": password }))
}

#[tokio::test]
async fn test_sixth_attempt_after_five_failures_is_rate_limited() {
    let app = TestApp::new();
    let peer = [203, 0, 113, 7];

    for _ in 0..5 {
        let response = app
            .request_from(peer, "POST", "/admin/login", credentials("wrong-password"), &[])
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let locked = app
        .request_from(peer, "POST", "/admin/login", credentials(ADMIN_PASSWORD), &[])
        .await;
    assert_eq!(locked.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(locked.code(), "RATE_LIMITED");
    assert_eq!(locked.body["retryAfter"], 900);

    // Other addresses are unaffected.
    let elsewhere = app
        .request_from([198, 51, 100, 1], "POST", "/admin/login", credentials(ADMIN_PASSWORD), &[])
        .await;
    assert_eq!(elsewhere.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_headers_do_not_escape_lockout() {
    let app = TestApp::new();
    let peer = [203, 0, 113, 7];

    for i in 0..5 {
        let forwarded = format!("198.51.100.{i}");
        let response = app
            .request_from(
                peer,
                "POST",
                "/admin/login",
                credentials("wrong-password"),
                &[("X-Forwarded-For", forwarded.as_str()), ("X-Real-IP", forwarded.as_str())],
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let locked = app
        .request_from(
            peer,
            "POST",
            "/admin/login",
            credentials("wrong-password"),
            &[("X-Forwarded-For", "198.51.100.99")],
        )
        .await;
    assert_eq!(locked.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(locked.code(), "RATE_LIMITED");
}

#[tokio::test]
async fn test_forwarded_for_is_the_client_behind_a_trusted_proxy() {
    let mut config = test_config();
    config.server.trust_proxy_headers = true;
    let app = TestApp::with_config(config);
    let proxy = [10, 0, 0, 1];

    for _ in 0..5 {
        let response = app
            .request_from(
                proxy,
                "POST",
                "/admin/login",
                credentials("wrong-password"),
                &[("X-Forwarded-For", "203.0.113.7")],
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let locked = app
        .request_from(
            proxy,
            "POST",
            "/admin/login",
            credentials(ADMIN_PASSWORD),
            &[("X-Forwarded-For", "203.0.113.7")],
        )
        .await;
    assert_eq!(locked.status, StatusCode::TOO_MANY_REQUESTS);

    let other_client = app
        .request_from(
            proxy,
            "POST",
            "/admin/login",
            credentials(ADMIN_PASSWORD),
            &[("X-Forwarded-For", "198.51.100.1")],
        )
        .await;
    assert_eq!(other_client.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_bucket_limits_each_client() {
    let mut config = test_config();
    config.rate_limit.requests_per_window = 3;
    config.rate_limit.window_seconds = 900;
    let app = TestApp::with_config(config);
    let peer = [203, 0, 113, 7];

    for i in 0..3 {
        let forwarded = format!("198.51.100.{i}");
        let response = app
            .request_from(peer, "GET", "/admin/verify", None, &[("X-Forwarded-For", forwarded.as_str())])
            .await;
        assert_eq!(response.code(), "NO_TOKEN");
    }

    let limited = app
        .request_from(peer, "GET", "/admin/verify", None, &[("X-Request-ID", "req-bucket-1")])
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.code(), "RATE_LIMITED");
    assert_eq!(limited.body["requestId"], "req-bucket-1");
    assert!(limited.body["retryAfter"].as_u64().unwrap() >= 1);

    // Health checks are exempt, and other clients keep their own bucket.
    let health = app.request_from(peer, "GET", "/health", None, &[]).await;
    assert_eq!(health.status, StatusCode::OK);
    let other = app
        .request_from([198, 51, 100, 1], "GET", "/admin/verify", None, &[])
        .await;
    assert_eq!(other.code(), "NO_TOKEN");
}

#[tokio::test]
async fn test_missing_token_echoes_request_id() {
    let app = TestApp::new();

    let response = app
        .request_with_headers("GET", "/admin/verify", None, None, &[("X-Request-ID", "req-it-1")])
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "NO_TOKEN");
    assert_eq!(response.body["requestId"], "req-it-1");
    assert_eq!(response.headers["x-request-id"], "req-it-1");
}

#[tokio::test]
async fn test_garbage_token_is_invalid() {
    let app = TestApp::new();
    let response = app
        .request("GET", "/admin/verify", None, Some("definitely.not.valid"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_expired_token_reports_token_expired() {
    let app = TestApp::new();
    let (_, session_id) = app.login().await;

    let subject = TokenSubject {
        sub: "admin".into(),
        email: ADMIN_EMAIL.into(),
        role: Role::Admin,
        sid: SessionId::from(session_id),
    };
    let expired = app
        .state
        .codec
        .issue_at(&subject, Duration::hours(1), Utc::now() - Duration::hours(3))
        .unwrap();

    let response = app
        .request("GET", "/admin/verify", None, Some(&expired.token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app = TestApp::new();
    let (token, _) = app.login().await;

    let logout = app.request("POST", "/admin/logout", None, Some(&token)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["success"], true);

    let verify = app.request("GET", "/admin/verify", None, Some(&token)).await;
    assert_eq!(verify.status, StatusCode::UNAUTHORIZED);
    assert_eq!(verify.code(), "TOKEN_INVALIDATED");
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let app = TestApp::new();
    let (token, session_id) = app.login().await;

    let refresh = app.request("POST", "/admin/refresh", None, Some(&token)).await;
    assert_eq!(refresh.status, StatusCode::OK);
    let fresh = refresh.body["token"].as_str().unwrap().to_string();
    assert_ne!(fresh, token);
    assert_eq!(refresh.body["admin"]["sessionId"], session_id.as_str());

    let old = app.request("GET", "/admin/verify", None, Some(&token)).await;
    assert_eq!(old.code(), "TOKEN_INVALIDATED");

    let new = app.request("GET", "/admin/verify", None, Some(&fresh)).await;
    assert_eq!(new.status, StatusCode::OK);

    // The rotated-out token cannot be refreshed again.
    let replay = app.request("POST", "/admin/refresh", None, Some(&token)).await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.code(), "REFRESH_FAILED");
}

#[tokio::test]
async fn test_refresh_accepts_expired_token_of_live_session() {
    let app = TestApp::new();
    let (_, session_id) = app.login().await;

    let subject = TokenSubject {
        sub: "admin".into(),
        email: ADMIN_EMAIL.into(),
        role: Role::Admin,
        sid: SessionId::from(session_id),
    };
    let expired = app
        .state
        .codec
        .issue_at(&subject, Duration::hours(1), Utc::now() - Duration::hours(2))
        .unwrap();

    let refresh = app
        .request("POST", "/admin/refresh", None, Some(&expired.token))
        .await;
    assert_eq!(refresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_token() {
    let app = TestApp::new();
    let response = app.request("POST", "/admin/refresh", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "NO_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = TestApp::new();
    app.login().await;

    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["activeSessions"], 1);
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.contains_key("x-request-id"));
}
