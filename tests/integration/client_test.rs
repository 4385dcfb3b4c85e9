//! End-to-end tests of the client session manager against a live server.

use std::sync::Arc;

use chrono::{Duration, Utc};

use folio_auth::{Role, SessionId, TokenSubject};
use folio_client::{
    AdminSession, AuthEvent, ClientConfig, CredentialStore, MemoryCredentialStore,
};

use crate::helpers::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp};

async fn connect(app: &TestApp) -> (AdminSession, Arc<MemoryCredentialStore>) {
    let base_url = app.spawn().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let session = AdminSession::connect(&ClientConfig::new(base_url), store.clone())
        .expect("Failed to build client");
    (session, store)
}

#[tokio::test]
async fn test_login_verify_logout() {
    let app = TestApp::new();
    let (client, store) = connect(&app).await;

    let login = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(store.token().as_deref(), Some(login.token.as_str()));
    assert_eq!(login.session_info.ip, "127.0.0.1");

    let verified = client.verify().await.unwrap();
    assert_eq!(verified.admin.id, login.admin.id);
    assert_eq!(verified.admin.session_id, login.admin.session_id);

    let sessions = client.sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].current);

    client.logout().await.unwrap();
    client.logout().await.unwrap();
    assert!(!client.is_authenticated());
    assert!(app.state.sessions.is_empty());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_transparently() {
    let app = TestApp::new();
    let (client, store) = connect(&app).await;
    let login = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let subject = TokenSubject {
        sub: login.admin.id.clone(),
        email: ADMIN_EMAIL.into(),
        role: Role::Admin,
        sid: SessionId::from(login.admin.session_id.clone()),
    };
    let expired = app
        .state
        .codec
        .issue_at(&subject, Duration::hours(1), Utc::now() - Duration::hours(2))
        .unwrap();
    store.replace_token(&expired.token).unwrap();
    let mut events = client.subscribe();

    let verified = client.verify().await.unwrap();
    assert_eq!(verified.admin.session_id, login.admin.session_id);

    let current = store.token().unwrap();
    assert_ne!(current, expired.token);
    assert_ne!(current, login.token);
    assert_eq!(events.try_recv().unwrap(), AuthEvent::TokenRefreshed);
}

#[tokio::test]
async fn test_server_side_revocation_requires_reauthentication() {
    let app = TestApp::new();
    let (client, store) = connect(&app).await;
    let login = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    let mut events = client.subscribe();

    app.state
        .sessions
        .revoke(&SessionId::from(login.admin.session_id.clone()));

    let err = client.verify().await.unwrap_err();
    assert_eq!(err.code(), "SESSION_EXPIRED");
    assert!(store.token().is_none());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::ReauthenticationRequired);

    assert!(client.restore().await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_requests_after_expiry_share_one_refresh() {
    let app = TestApp::new();
    let (client, store) = connect(&app).await;
    let login = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let subject = TokenSubject {
        sub: login.admin.id.clone(),
        email: ADMIN_EMAIL.into(),
        role: Role::Admin,
        sid: SessionId::from(login.admin.session_id.clone()),
    };
    let expired = app
        .state
        .codec
        .issue_at(&subject, Duration::hours(1), Utc::now() - Duration::hours(2))
        .unwrap();
    store.replace_token(&expired.token).unwrap();
    let mut events = client.subscribe();

    let results = futures::future::join_all((0..5).map(|_| client.verify())).await;
    assert!(results.iter().all(Result::is_ok));

    assert_eq!(events.try_recv().unwrap(), AuthEvent::TokenRefreshed);
    assert!(events.try_recv().is_err());
}
