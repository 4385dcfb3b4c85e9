//! High-level admin session operations on top of [`SessionClient`].

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::client::{AuthEvent, SessionClient, SessionContext};
use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, StoredCredential};
use crate::error::ClientError;
use crate::models::{LoginResponse, RevokeAllResponse, SessionEntry, SessionsResponse, VerifyResponse};
use crate::transport::{ApiRequest, HttpTransport, RequestKind};

/// The admin's view of their own authentication.
#[derive(Debug, Clone)]
pub struct AdminSession {
    client: SessionClient,
}

impl AdminSession {
    pub fn new(client: SessionClient) -> Self {
        Self { client }
    }

    /// Connects to `config.base_url` over HTTP with a fresh context.
    pub fn connect(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::new(&config.base_url)?);
        let context = SessionContext::new(store);
        Ok(Self::new(SessionClient::new(
            transport,
            context,
            config.timeouts.clone(),
        )))
    }

    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.client.subscribe()
    }

    /// Whether a token is stored. Says nothing about its validity.
    pub fn is_authenticated(&self) -> bool {
        self.client.store().token().is_some()
    }

    /// Logs in and stores the issued token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = ApiRequest::post(
            "/admin/login",
            Some(json!({ "email": email, "password": password })),
        )
        .with_kind(RequestKind::Login);

        let response: LoginResponse = self.client.execute(request).await?.json()?;
        self.client.store().save(&StoredCredential {
            token: response.token.clone(),
            login_time: Utc::now(),
        })?;
        info!(admin = %response.admin.email, "Logged in");
        Ok(response)
    }

    /// Ends the session. The local credential is cleared even when the
    /// server call fails; calling it twice is fine.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.client.store().token().is_some() {
            let request = ApiRequest::post("/admin/logout", None)
                .with_kind(RequestKind::Logout)
                .without_refresh();
            if let Err(e) = self.client.execute(request).await {
                warn!(error = %e, "Server logout failed; clearing local credential anyway");
            }
        } else {
            debug!("Logout without a stored credential");
        }
        self.client.store().clear()
    }

    /// Checks the stored token on start-up.
    ///
    /// Returns `Ok(None)` when nothing is stored or the server no longer
    /// accepts the credential (which is then cleared).
    pub async fn restore(&self) -> Result<Option<VerifyResponse>, ClientError> {
        if self.client.store().token().is_none() {
            return Ok(None);
        }
        match self.verify().await {
            Ok(verified) => Ok(Some(verified)),
            Err(e) if e.is_unauthorized() || e == ClientError::NotAuthenticated => {
                debug!(code = e.code(), "Stored credential rejected");
                self.client.store().clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn verify(&self) -> Result<VerifyResponse, ClientError> {
        let request = ApiRequest::get("/admin/verify").with_kind(RequestKind::Verify);
        self.client.execute(request).await?.json()
    }

    pub async fn sessions(&self) -> Result<Vec<SessionEntry>, ClientError> {
        let response: SessionsResponse = self
            .client
            .execute(ApiRequest::get("/admin/sessions"))
            .await?
            .json()?;
        Ok(response.sessions)
    }

    pub async fn revoke_session(&self, session_id: &str) -> Result<(), ClientError> {
        self.client
            .execute(ApiRequest::delete(format!("/admin/sessions/{session_id}")))
            .await?;
        Ok(())
    }

    /// Revokes every session including this one, then clears the credential.
    pub async fn revoke_all(&self) -> Result<usize, ClientError> {
        let response: RevokeAllResponse = self
            .client
            .execute(ApiRequest::post("/admin/sessions/revoke-all", None))
            .await?
            .json()?;
        self.client.store().clear()?;
        Ok(response.revoked)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::config::Timeouts;
    use crate::credentials::MemoryCredentialStore;
    use crate::transport::{ApiResponse, Transport};

    /// Minimal admin API: one valid token at a time.
    #[derive(Debug, Default)]
    struct FakeApi {
        valid: Mutex<Option<String>>,
        calls: Mutex<Vec<String>>,
        logout_fails: bool,
    }

    impl FakeApi {
        fn admin() -> Value {
            json!({
                "id": "admin",
                "email": "admin@example.com",
                "role": "admin",
                "sessionId": "s1",
                "permissions": ["read:projects"]
            })
        }

        fn reject() -> ApiResponse {
            ApiResponse::new(401, json!({"error": "Session expired", "code": "SESSION_EXPIRED"}))
        }
    }

    #[async_trait]
    impl Transport for FakeApi {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
            self.calls.lock().unwrap().push(request.path.clone());
            let authorized = {
                let valid = self.valid.lock().unwrap();
                valid.is_some() && request.bearer() == valid.as_deref()
            };

            let response = match request.path.as_str() {
                "/admin/login" => {
                    let body = request.body.clone().unwrap_or_default();
                    if body["password"] != "correct horse battery" {
                        return Ok(ApiResponse::new(
                            401,
                            json!({"error": "Invalid credentials", "code": "INVALID_CREDENTIALS"}),
                        ));
                    }
                    *self.valid.lock().unwrap() = Some("tok-1".into());
                    ApiResponse::new(200, json!({
                        "token": "tok-1",
                        "admin": Self::admin(),
                        "expiresIn": "24h",
                        "sessionInfo": {"userAgent": null, "ip": "127.0.0.1", "createdAt": "2026-01-01T00:00:00Z"}
                    }))
                }
                "/admin/refresh" => Self::reject(),
                _ if !authorized => Self::reject(),
                "/admin/logout" if self.logout_fails => {
                    ApiResponse::new(500, json!({"error": "boom", "code": "SERVER_ERROR"}))
                }
                "/admin/logout" => {
                    *self.valid.lock().unwrap() = None;
                    ApiResponse::new(200, json!({"success": true, "message": "Logged out"}))
                }
                "/admin/verify" => ApiResponse::new(200, json!({
                    "admin": Self::admin(),
                    "permissions": ["read:projects"],
                    "sessionValid": true,
                    "environment": "test",
                    "serverTime": "2026-01-01T00:00:00Z"
                })),
                "/admin/sessions/revoke-all" => {
                    *self.valid.lock().unwrap() = None;
                    ApiResponse::new(200, json!({"success": true, "revoked": 2, "message": "ok"}))
                }
                _ => ApiResponse::new(404, json!({"error": "Not found", "code": "NOT_FOUND"})),
            };
            Ok(response)
        }
    }

    fn session(api: &Arc<FakeApi>, store: &Arc<MemoryCredentialStore>) -> AdminSession {
        let client = SessionClient::new(
            api.clone(),
            SessionContext::new(store.clone()),
            Timeouts::default(),
        );
        AdminSession::new(client)
    }

    #[tokio::test]
    async fn test_login_stores_token_and_verify_succeeds() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(&api, &store);

        let login = session.login("admin@example.com", "correct horse battery").await.unwrap();
        assert_eq!(login.admin.id, "admin");
        assert_eq!(store.token().as_deref(), Some("tok-1"));
        assert!(session.is_authenticated());

        let verified = session.verify().await.unwrap();
        assert!(verified.session_valid);
        assert_eq!(verified.admin.session_id, "s1");
    }

    #[tokio::test]
    async fn test_failed_login_stores_nothing() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryCredentialStore::new());
        let err = session(&api, &store)
            .login("admin@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(&api, &store);
        session.login("admin@example.com", "correct horse battery").await.unwrap();

        session.logout().await.unwrap();
        session.logout().await.unwrap();

        assert!(store.token().is_none());
        let calls = api.calls.lock().unwrap().clone();
        assert_eq!(calls.iter().filter(|p| *p == "/admin/logout").count(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_locally_when_server_fails() {
        let api = Arc::new(FakeApi {
            logout_fails: true,
            ..FakeApi::default()
        });
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(&api, &store);
        session.login("admin@example.com", "correct horse battery").await.unwrap();

        session.logout().await.unwrap();
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_token_makes_no_request() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryCredentialStore::new());
        assert!(session(&api, &store).restore().await.unwrap().is_none());
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_with_rejected_token_clears_it() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryCredentialStore::with_token("from-before-restart"));
        let session = session(&api, &store);
        let mut events = session.subscribe();

        assert!(session.restore().await.unwrap().is_none());
        assert!(store.token().is_none());
        assert_eq!(events.try_recv().unwrap(), AuthEvent::ReauthenticationRequired);
    }

    #[tokio::test]
    async fn test_revoke_all_clears_credential() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryCredentialStore::new());
        let session = session(&api, &store);
        session.login("admin@example.com", "correct horse battery").await.unwrap();

        assert_eq!(session.revoke_all().await.unwrap(), 2);
        assert!(!session.is_authenticated());
    }
}
