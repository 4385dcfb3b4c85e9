//! Per-request authentication pipeline.
//!
//! Order of checks: bearer header, token decode, blacklist, session
//! lookup, session ownership. The first failing check decides the error
//! code; nothing is retried.

use std::sync::Arc;

use tracing::debug;

use folio_core::error::AppError;

use crate::blacklist::TokenBlacklist;
use crate::session::{Session, SessionStore};
use crate::token::{Claims, TokenCodec};

/// A request that passed the gate.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The raw bearer token, kept so logout can blacklist it.
    pub token: String,
    pub claims: Claims,
    pub session: Session,
}

impl Authenticated {
    pub fn identity_id(&self) -> &str {
        self.claims.identity_id()
    }
}

/// Validates bearer tokens against the codec, the blacklist, and the session store.
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    blacklist: Arc<TokenBlacklist>,
    sessions: Arc<SessionStore>,
}

impl AuthGate {
    pub fn new(
        codec: Arc<TokenCodec>,
        blacklist: Arc<TokenBlacklist>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            codec,
            blacklist,
            sessions,
        }
    }

    /// Runs the full pipeline on an `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Authenticated, AppError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or_else(|| AppError::no_token("No token provided, authorization denied"))?;

        let claims = self.codec.verify(token).map_err(AppError::from)?;

        if self.blacklist.is_blacklisted(token) {
            debug!(session_id = %claims.session_id(), "Rejected blacklisted token");
            return Err(AppError::blacklisted_token("Token has been invalidated"));
        }

        let session = self
            .sessions
            .get(claims.session_id())
            .filter(|s| s.active)
            .ok_or_else(|| AppError::session_expired("Session expired or invalid"))?;

        if session.identity_id != claims.identity_id() {
            return Err(AppError::invalid_account("Invalid admin account"));
        }

        self.sessions.touch(&session.id);

        Ok(Authenticated {
            token: token.to_string(),
            claims,
            session,
        })
    }
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
