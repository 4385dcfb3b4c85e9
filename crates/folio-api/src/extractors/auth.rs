//! `AdminUser` extractor: runs the auth gate on the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{error, warn};

use folio_auth::Authenticated;

use crate::error::ApiError;
use crate::extractors::client::RequestId;
use crate::state::AppState;

/// An authenticated admin request.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub auth: Authenticated,
    pub request_id: String,
}

impl std::ops::Deref for AdminUser {
    type Target = Authenticated;
    fn deref(&self) -> &Self::Target {
        &self.auth
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request_id = RequestId::from_headers(&parts.headers);
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match state.gate.authenticate(header) {
            Ok(auth) => Ok(Self {
                auth,
                request_id: request_id.unwrap_or_else(RequestId::generate),
            }),
            Err(e) => {
                if e.kind.is_authentication_failure() {
                    warn!(
                        code = e.code(),
                        path = %parts.uri.path(),
                        request_id = ?request_id,
                        "Authentication rejected"
                    );
                } else {
                    error!(
                        code = e.code(),
                        path = %parts.uri.path(),
                        request_id = ?request_id,
                        "Authentication check failed: {}",
                        e.message
                    );
                }
                Err(ApiError::new(e, request_id))
            }
        }
    }
}
