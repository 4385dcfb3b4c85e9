//! Token attachment and single-flight refresh.
//!
//! A [`SessionContext`] is the state shared by every client of one user
//! agent: the credential store, the in-flight refresh slot, and the auth
//! event channel. Clients built on the same context never run two
//! refreshes at once, even when they are separate instances.

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::Timeouts;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::transport::{ApiRequest, ApiResponse, RequestKind, Transport};

/// Notifications for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A refresh succeeded and the stored token was replaced.
    TokenRefreshed,
    /// The stored credential was dropped; the user must log in again.
    ReauthenticationRequired,
}

type RefreshFuture = Shared<BoxFuture<'static, Result<String, ClientError>>>;

/// State shared by all clients of one credential store.
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    refresh: Mutex<Option<RefreshFuture>>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let refreshing = self
            .refresh
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("SessionContext")
            .field("store", &self.store)
            .field("refreshing", &refreshing)
            .finish()
    }
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            store,
            refresh: Mutex::new(None),
            events,
        })
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn clear_refresh(&self) {
        *self.refresh.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Deserialize)]
struct RefreshBody {
    token: String,
}

/// HTTP client that manages the admin token.
#[derive(Debug, Clone)]
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    context: Arc<SessionContext>,
    timeouts: Timeouts,
}

impl SessionClient {
    pub fn new(transport: Arc<dyn Transport>, context: Arc<SessionContext>, timeouts: Timeouts) -> Self {
        Self {
            transport,
            context,
            timeouts,
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        self.context.store()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.context.subscribe()
    }

    /// Sends `request`, refreshing the token once on `401`.
    ///
    /// If the refresh fails, the original error is returned.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let sent_token = if request.kind.is_authentication() {
            None
        } else {
            self.store().token()
        };

        let err = match self.send_once(&request, sent_token.as_deref()).await {
            Err(err) if err.is_unauthorized() && request.allows_refresh() => err,
            other => return other,
        };

        let token = match self.refresh(sent_token).await {
            Ok(token) => token,
            Err(refresh_err) => {
                debug!(path = %request.path, error = %refresh_err, "Refresh failed, returning original error");
                return Err(err);
            }
        };

        let mut replay = request;
        replay.retried = true;
        self.send_once(&replay, Some(token.as_str())).await
    }

    /// Joins the refresh in flight or starts one.
    ///
    /// `failed_token` is the token the rejected request carried; if the
    /// store already holds a different one, another caller refreshed
    /// first and that token is used as is.
    pub async fn refresh(&self, failed_token: Option<String>) -> Result<String, ClientError> {
        let shared = {
            let mut slot = self.context.refresh.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(inflight) => inflight.clone(),
                None => {
                    let this = self.clone();
                    let fut = async move {
                        let result = this.run_refresh(failed_token).await;
                        this.context.clear_refresh();
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };
        shared.await
    }

    async fn run_refresh(&self, failed_token: Option<String>) -> Result<String, ClientError> {
        // An empty store was cleared by whoever signalled already.
        let Some(current) = self.store().token() else {
            debug!("No stored credential to refresh");
            return Err(ClientError::NotAuthenticated);
        };

        if failed_token.as_deref() != Some(current.as_str()) {
            debug!("Stored token changed since the request was sent; reusing it");
            return Ok(current);
        }

        let request = ApiRequest::post("/admin/refresh", None).with_kind(RequestKind::Refresh);
        let refreshed = self
            .send_once(&request, Some(current.as_str()))
            .await
            .and_then(|response| response.json::<RefreshBody>());

        match refreshed {
            Ok(body) => {
                self.store().replace_token(&body.token)?;
                info!("Admin token refreshed");
                self.context.emit(AuthEvent::TokenRefreshed);
                Ok(body.token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh rejected; clearing credentials");
                if let Err(clear_err) = self.store().clear() {
                    warn!(error = %clear_err, "Failed to clear credentials");
                }
                self.context.emit(AuthEvent::ReauthenticationRequired);
                Err(ClientError::RefreshFailed)
            }
        }
    }

    /// One attempt: headers, deadline, status check. No refresh.
    async fn send_once(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let mut prepared = request.clone();
        if let Some(token) = token {
            prepared
                .headers
                .push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        prepared
            .headers
            .push(("X-Request-ID".to_string(), generate_request_id()));
        prepared
            .headers
            .push(("X-Requested-With".to_string(), "XMLHttpRequest".to_string()));

        let deadline = self.timeouts.for_kind(request.kind);
        let response = tokio::time::timeout(deadline, self.transport.send(&prepared))
            .await
            .map_err(|_| ClientError::NetworkTimeout(deadline))??;

        if response.is_success() {
            Ok(response)
        } else {
            Err(ClientError::from_response(response.status, &response.body))
        }
    }
}

/// `req_<unix millis>_<random hex>`.
fn generate_request_id() -> String {
    format!(
        "req_{}_{:08x}",
        chrono::Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}
