//! Maps domain `AppError` to HTTP responses.
//!
//! Every error leaves the server in the same envelope:
//! `{error, code, requestId?, details?, retryAfter?}`.

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::RETRY_AFTER;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use folio_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Seconds until the client may retry, on 429 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// An [`AppError`] plus the request context it is reported with.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub request_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(error: AppError, request_id: impl Into<Option<String>>) -> Self {
        Self {
            error,
            request_id: request_id.into(),
            details: None,
            retry_after: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error, None)
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NoToken
        | ErrorKind::MalformedToken
        | ErrorKind::ExpiredToken
        | ErrorKind::BlacklistedToken
        | ErrorKind::SessionExpired
        | ErrorKind::InvalidAccount
        | ErrorKind::InvalidCredentials
        | ErrorKind::NoRefreshToken
        | ErrorKind::RefreshFailed => StatusCode::UNAUTHORIZED,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Validation | ErrorKind::CurrentSession => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NetworkTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind;
        let status = status_for(kind);

        let message = match kind {
            ErrorKind::Configuration | ErrorKind::Internal => {
                tracing::error!(
                    error = %self.error.message,
                    request_id = ?self.request_id,
                    "Internal server error"
                );
                "Authentication server error".to_string()
            }
            _ => self.error.message,
        };

        let body = ApiErrorResponse {
            error: message,
            code: kind.code().to_string(),
            request_id: self.request_id,
            details: self.details,
            retry_after: self.retry_after,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = self.retry_after {
            response.headers_mut().insert(RETRY_AFTER, seconds.into());
        }
        response
    }
}
