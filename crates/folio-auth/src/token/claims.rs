//! Claims structure carried by every admin token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Identity, Role};
use crate::session::SessionId;

/// Identity fields a caller asks the codec to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSubject {
    /// Subject: the identity id.
    pub sub: String,
    /// Email of the identity at issuance.
    pub email: String,
    /// Role of the identity at issuance.
    pub role: Role,
    /// Session this token belongs to.
    pub sid: SessionId,
}

impl TokenSubject {
    pub fn new(identity: &Identity, session_id: &SessionId) -> Self {
        Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            sid: session_id.clone(),
        }
    }
}

/// Full payload: the subject plus the registered claims the codec adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub subject: TokenSubject,
    /// Token id; the session id.
    pub jti: String,
    /// Random per-issuance value. A refreshed token never equals the one it replaces.
    pub nonce: String,
    pub iss: String,
    pub aud: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Not-before (seconds since epoch).
    pub nbf: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn identity_id(&self) -> &str {
        &self.subject.sub
    }

    pub fn session_id(&self) -> &SessionId {
        &self.subject.sid
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Remaining lifetime in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }
}
