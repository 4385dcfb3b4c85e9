//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::{Duration, Instant};

use folio_auth::{
    AdminAccount, AuthGate, LoginAttemptTracker, SessionManager, SessionStore, Sweeper,
    TokenBlacklist, TokenCodec,
};
use folio_core::config::AppConfig;
use folio_core::error::AppError;

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token signer and verifier
    pub codec: Arc<TokenCodec>,
    /// Live sessions
    pub sessions: Arc<SessionStore>,
    /// Revoked tokens
    pub blacklist: Arc<TokenBlacklist>,
    /// Per-request validation pipeline
    pub gate: AuthGate,
    /// Login, refresh, logout, and revocation flows
    pub session_manager: Arc<SessionManager>,

    // ── Infrastructure ───────────────────────────────────────
    /// Per-IP request limiter
    pub rate_limiter: RateLimiter,
    /// Process start, for the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Wires every component from configuration.
    ///
    /// Fails with a configuration error when the signing secret or the
    /// admin credentials are missing.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        config.validate()?;

        let codec = Arc::new(TokenCodec::new(&config.auth)?);
        let admin = Arc::new(AdminAccount::from_config(&config.auth)?);
        let sessions = Arc::new(SessionStore::new(&config.session));
        let blacklist = Arc::new(TokenBlacklist::new());
        let gate = AuthGate::new(codec.clone(), blacklist.clone(), sessions.clone());
        let session_manager = Arc::new(SessionManager::new(
            codec.clone(),
            sessions.clone(),
            blacklist.clone(),
            admin,
            LoginAttemptTracker::new(&config.rate_limit),
            &config.auth,
        ));
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);

        Ok(Self {
            config: Arc::new(config),
            codec,
            sessions,
            blacklist,
            gate,
            session_manager,
            rate_limiter,
            started_at: Instant::now(),
        })
    }

    /// Background cleanup task over this state's sessions and blacklist.
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(
            self.sessions.clone(),
            self.blacklist.clone(),
            Duration::from_secs(self.config.session.sweep_interval_seconds),
        )
    }
}
