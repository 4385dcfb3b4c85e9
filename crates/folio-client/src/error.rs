//! Client-side error type.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced to callers of the session client.
///
/// `Clone` so one failure can be handed to every request waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },
    /// The request did not complete within its deadline.
    #[error("request timed out after {0:?}")]
    NetworkTimeout(Duration),
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The token could not be refreshed; the user must log in again.
    #[error("token refresh failed")]
    RefreshFailed,
    /// No credential is stored.
    #[error("not authenticated")]
    NotAuthenticated,
    /// The response body did not have the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// The credential store could not be read or written.
    #[error("credential storage error: {0}")]
    Storage(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

impl ClientError {
    /// Builds an API error from a failed response.
    pub fn from_response(status: u16, body: &serde_json::Value) -> Self {
        let parsed = serde_json::from_value::<ErrorBody>(body.clone()).ok();
        let (message, code, request_id) = match parsed {
            Some(b) => (b.error, b.code, b.request_id),
            None => (None, None, None),
        };
        Self::Api {
            status,
            code: code.unwrap_or_else(|| format!("HTTP_{status}")),
            message: message.unwrap_or_else(|| "Request failed".to_string()),
            request_id,
        }
    }

    /// Stable code, matching the server's codes for API errors.
    pub fn code(&self) -> &str {
        match self {
            Self::Api { code, .. } => code,
            Self::NetworkTimeout(_) => "NETWORK_TIMEOUT",
            Self::Transport(_) => "NETWORK_ERROR",
            Self::RefreshFailed => "REFRESH_FAILED",
            Self::NotAuthenticated => "NO_TOKEN",
            Self::Decode(_) => "INVALID_RESPONSE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether the server rejected the caller's credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
