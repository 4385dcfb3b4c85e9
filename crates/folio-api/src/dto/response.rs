//! Response DTOs.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_auth::{Authenticated, Identity, Permission, Session, SessionId};

/// The admin as reported to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfo {
    pub id: String,
    pub email: String,
    pub role: String,
    pub session_id: SessionId,
    pub permissions: Vec<Permission>,
}

impl AdminInfo {
    pub fn new(identity: &Identity, session: &Session) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role.to_string(),
            session_id: session.id.clone(),
            permissions: session.permissions.iter().copied().collect(),
        }
    }

    /// Built from the token claims and the session the gate resolved.
    pub fn from_auth(auth: &Authenticated) -> Self {
        let subject = &auth.claims.subject;
        Self {
            id: subject.sub.clone(),
            email: subject.email.clone(),
            role: subject.role.to_string(),
            session_id: auth.session.id.clone(),
            permissions: auth.session.permissions.iter().copied().collect(),
        }
    }
}

/// Where and when a session was opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_agent: Option<String>,
    pub ip: String,
    pub created_at: DateTime<Utc>,
}

/// `POST /admin/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminInfo,
    /// Token lifetime, e.g. `"24h"`.
    pub expires_in: String,
    pub session_info: SessionInfo,
}

/// `POST /admin/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub admin: AdminInfo,
    pub expires_in: String,
}

/// `GET /admin/verify`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub admin: AdminInfo,
    pub permissions: Vec<Permission>,
    pub session_valid: bool,
    pub environment: String,
    pub server_time: DateTime<Utc>,
}

/// One entry of `GET /admin/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub user_agent: Option<String>,
    pub ip: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    /// Whether this is the session of the calling token.
    pub current: bool,
}

impl SessionSummary {
    pub fn new(session: Session, current: &SessionId) -> Self {
        Self {
            current: session.id == *current,
            session_id: session.id,
            user_agent: session.user_agent,
            ip: session.ip,
            created_at: session.created_at,
            last_active: session.last_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

/// Simple acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `POST /admin/sessions/revoke-all`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeAllResponse {
    pub success: bool,
    pub revoked: usize,
    pub message: String,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Formats a token lifetime the way clients expect it (`"24h"`, `"90s"`).
pub fn format_lifetime(seconds: i64) -> String {
    if seconds > 0 && seconds % 3600 == 0 {
        format!("{}h", seconds / 3600)
    } else {
        format!("{seconds}s")
    }
}
