//! Session lifecycle flows: login, refresh, logout, and revocation.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::time::Instant;
use tracing::{info, warn};

use folio_core::config::AuthConfig;
use folio_core::error::{AppError, ErrorKind};

use crate::attempts::LoginAttemptTracker;
use crate::blacklist::TokenBlacklist;
use crate::credentials::AdminAccount;
use crate::gate::Authenticated;
use crate::identity::Identity;
use crate::token::{IssuedToken, TokenCodec, TokenSubject};

use super::model::{Session, SessionId};
use super::store::SessionStore;

/// Result of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub identity: Identity,
    pub session: Session,
}

/// Coordinates the codec, the session store, and the blacklist.
#[derive(Clone)]
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    sessions: Arc<SessionStore>,
    blacklist: Arc<TokenBlacklist>,
    admin: Arc<AdminAccount>,
    attempts: LoginAttemptTracker,
    login_delay_ms: (u64, u64),
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.sessions.len())
            .field("blacklisted", &self.blacklist.len())
            .field("login_delay_ms", &self.login_delay_ms)
            .finish()
    }
}

impl SessionManager {
    pub fn new(
        codec: Arc<TokenCodec>,
        sessions: Arc<SessionStore>,
        blacklist: Arc<TokenBlacklist>,
        admin: Arc<AdminAccount>,
        attempts: LoginAttemptTracker,
        auth_config: &AuthConfig,
    ) -> Self {
        Self {
            codec,
            sessions,
            blacklist,
            admin,
            attempts,
            login_delay_ms: (auth_config.login_delay_min_ms, auth_config.login_delay_max_ms),
        }
    }

    pub fn admin(&self) -> &AdminAccount {
        &self.admin
    }

    /// Performs the login flow:
    ///
    /// 1. Refuse locked-out `ip-email` pairs before looking at credentials
    /// 2. Verify credentials
    /// 3. Create the session and sign its token
    ///
    /// Steps 2 and 3 are padded to a random response time so success and
    /// failure are indistinguishable by timing.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip: &str,
        user_agent: Option<&str>,
    ) -> Result<LoginOutcome, AppError> {
        let attempt_key = LoginAttemptTracker::key(ip, email);
        if self.attempts.is_locked(&attempt_key).await {
            warn!(ip = %ip, "Login refused: too many failed attempts");
            return Err(AppError::rate_limited(
                "Too many login attempts. Please try again in 15 minutes.",
            ));
        }

        let started = Instant::now();
        let result = self.try_login(email, password, ip, user_agent, &attempt_key).await;
        tokio::time::sleep_until(started + self.login_delay()).await;
        result
    }

    async fn try_login(
        &self,
        email: &str,
        password: &str,
        ip: &str,
        user_agent: Option<&str>,
        attempt_key: &str,
    ) -> Result<LoginOutcome, AppError> {
        let Some(identity) = self.admin.verify(email, password)?.cloned() else {
            let failures = self.attempts.record_failure(attempt_key).await;
            warn!(
                ip = %ip,
                failures,
                max_failures = self.attempts.max_failures(),
                "Failed login attempt"
            );
            return Err(AppError::invalid_credentials("Invalid credentials"));
        };
        self.attempts.clear(attempt_key).await;

        let session = self.sessions.create(&identity, user_agent, ip);
        let token = match self.issue_for(&identity, &session.id) {
            Ok(token) => token,
            Err(e) => {
                self.sessions.revoke(&session.id);
                return Err(e);
            }
        };

        info!(
            identity_id = %identity.id,
            session_id = %session.id,
            ip = %ip,
            "Login successful"
        );

        Ok(LoginOutcome {
            token,
            identity,
            session,
        })
    }

    /// Exchanges a possibly expired token for a new one on the same session.
    ///
    /// The presented token is blacklisted on success. Refresh stays possible
    /// for as long as the session itself is alive.
    pub async fn refresh(&self, token: Option<&str>) -> Result<LoginOutcome, AppError> {
        let token = token.ok_or_else(|| AppError::no_refresh_token("No token provided"))?;

        let claims = self.codec.verify_ignoring_expiry(token).map_err(|e| {
            warn!(error = %e, "Refresh rejected: token did not verify");
            AppError::refresh_failed("Token refresh failed")
        })?;

        if self.blacklist.is_blacklisted(token) {
            warn!(session_id = %claims.session_id(), "Refresh rejected: token was invalidated");
            return Err(AppError::refresh_failed("Token refresh failed"));
        }

        let session = self
            .sessions
            .get(claims.session_id())
            .filter(|s| s.active)
            .ok_or_else(|| AppError::session_expired("Session expired. Please login again."))?;

        let identity = self
            .admin
            .resolve(claims.identity_id())
            .filter(|identity| identity.id == session.identity_id)
            .cloned()
            .ok_or_else(|| AppError::refresh_failed("Token refresh failed"))?;

        let issued = self.issue_for(&identity, &session.id)?;
        self.blacklist.add(token);
        self.sessions.touch(&session.id);

        info!(identity_id = %identity.id, session_id = %session.id, "Token refreshed");

        Ok(LoginOutcome {
            token: issued,
            identity,
            session,
        })
    }

    /// Blacklists the caller's token and removes its session.
    pub async fn logout(&self, auth: &Authenticated) -> Result<(), AppError> {
        self.blacklist.add(&auth.token);
        self.sessions.revoke(&auth.session.id);
        info!(
            identity_id = %auth.identity_id(),
            session_id = %auth.session.id,
            "Logout completed"
        );
        Ok(())
    }

    /// Live sessions of the caller's identity.
    pub fn sessions_for(&self, auth: &Authenticated) -> Vec<Session> {
        self.sessions.list_for(auth.identity_id())
    }

    /// Revokes another session of the caller's identity.
    ///
    /// Unknown ids succeed without effect, like a repeated revoke.
    pub async fn revoke_session(
        &self,
        auth: &Authenticated,
        target: &SessionId,
    ) -> Result<(), AppError> {
        if *target == auth.session.id {
            return Err(AppError::new(
                ErrorKind::CurrentSession,
                "Cannot revoke the current session; use logout instead",
            ));
        }

        let Some(session) = self.sessions.get(target) else {
            return Ok(());
        };
        if session.identity_id != auth.identity_id() {
            return Err(AppError::not_found("Session not found"));
        }

        self.sessions.revoke(target);
        info!(
            identity_id = %auth.identity_id(),
            session_id = %target,
            revoked_by = %auth.session.id,
            "Session revoked"
        );
        Ok(())
    }

    /// Revokes every session of the caller's identity, including its own.
    pub async fn revoke_all(&self, auth: &Authenticated) -> Result<usize, AppError> {
        let revoked = self.sessions.revoke_all(auth.identity_id());
        self.blacklist.add(&auth.token);
        info!(identity_id = %auth.identity_id(), revoked, "All sessions revoked");
        Ok(revoked)
    }

    fn issue_for(&self, identity: &Identity, session_id: &SessionId) -> Result<IssuedToken, AppError> {
        self.codec.issue(
            &TokenSubject::new(identity, session_id),
            self.codec.default_lifetime(),
        )
    }

    fn login_delay(&self) -> StdDuration {
        let (min, max) = self.login_delay_ms;
        if max <= min {
            return StdDuration::from_millis(min);
        }
        StdDuration::from_millis(rand::random_range(min..=max))
    }
}
