//! Integration tests for session listing and revocation.

use axum::http::StatusCode;

use folio_auth::SessionId;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_list_sessions_marks_current() {
    let app = TestApp::new();
    let (_, first) = app.login().await;
    let (token, second) = app.login().await;

    let response = app.request("GET", "/admin/sessions", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let sessions = response.body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    let current: Vec<&str> = sessions
        .iter()
        .filter(|s| s["current"] == true)
        .map(|s| s["sessionId"].as_str().unwrap())
        .collect();
    assert_eq!(current, vec![second.as_str()]);
    assert!(sessions.iter().any(|s| s["sessionId"] == first.as_str()));
}

#[tokio::test]
async fn test_revoked_session_rejects_its_token() {
    let app = TestApp::new();
    let (victim_token, victim) = app.login().await;
    let (token, _) = app.login().await;

    let revoke = app
        .request("DELETE", &format!("/admin/sessions/{victim}"), None, Some(&token))
        .await;
    assert_eq!(revoke.status, StatusCode::OK);

    let verify = app
        .request("GET", "/admin/verify", None, Some(&victim_token))
        .await;
    assert_eq!(verify.status, StatusCode::UNAUTHORIZED);
    assert_eq!(verify.code(), "SESSION_EXPIRED");

    // Refresh cannot bring it back either.
    let refresh = app
        .request("POST", "/admin/refresh", None, Some(&victim_token))
        .await;
    assert_eq!(refresh.code(), "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_session_removed_behind_the_api_is_expired() {
    let app = TestApp::new();
    let (token, session_id) = app.login().await;

    assert!(app.state.sessions.revoke(&SessionId::from(session_id)));

    let verify = app.request("GET", "/admin/verify", None, Some(&token)).await;
    assert_eq!(verify.code(), "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_cannot_revoke_current_session() {
    let app = TestApp::new();
    let (token, session_id) = app.login().await;

    let response = app
        .request("DELETE", &format!("/admin/sessions/{session_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "CANNOT_REVOKE_CURRENT");

    let verify = app.request("GET", "/admin/verify", None, Some(&token)).await;
    assert_eq!(verify.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoking_unknown_session_succeeds() {
    let app = TestApp::new();
    let (token, _) = app.login().await;

    let response = app
        .request("DELETE", "/admin/sessions/does-not-exist", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_all_ends_every_session() {
    let app = TestApp::new();
    let (other_token, _) = app.login().await;
    let (token, _) = app.login().await;

    let response = app
        .request("POST", "/admin/sessions/revoke-all", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["revoked"], 2);

    let own = app.request("GET", "/admin/verify", None, Some(&token)).await;
    assert_eq!(own.code(), "TOKEN_INVALIDATED");
    let other = app.request("GET", "/admin/verify", None, Some(&other_token)).await;
    assert_eq!(other.code(), "SESSION_EXPIRED");
    assert!(app.state.sessions.is_empty());
}
