//! Unified application error types for Folio.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Every [`ErrorKind`] owns a stable,
//! machine-readable code that is sent over the wire unchanged.

use std::fmt;
use thiserror::Error;

/// Error categories of the admin authentication service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No bearer credential was presented.
    NoToken,
    /// The token could not be decoded or its signature is wrong.
    MalformedToken,
    /// The token is past its expiry or its maximum age.
    ExpiredToken,
    /// The token was revoked before its natural expiry.
    BlacklistedToken,
    /// The session referenced by the token no longer exists.
    SessionExpired,
    /// The token subject does not own the referenced session.
    InvalidAccount,
    /// Login with a wrong email or password.
    InvalidCredentials,
    /// Too many requests or failed logins.
    RateLimited,
    /// The refresh endpoint was called without a token.
    NoRefreshToken,
    /// Token refresh was rejected.
    RefreshFailed,
    /// A request did not complete within its deadline.
    NetworkTimeout,
    /// Input validation failed.
    Validation,
    /// The caller tried to revoke the session it is using.
    CurrentSession,
    /// The requested resource was not found.
    NotFound,
    /// The server is misconfigured (missing secret or credentials).
    Configuration,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Returns the stable wire code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoToken => "NO_TOKEN",
            Self::MalformedToken => "INVALID_TOKEN",
            Self::ExpiredToken => "TOKEN_EXPIRED",
            Self::BlacklistedToken => "TOKEN_INVALIDATED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::InvalidAccount => "INVALID_ACCOUNT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::RateLimited => "RATE_LIMITED",
            Self::NoRefreshToken => "NO_REFRESH_TOKEN",
            Self::RefreshFailed => "REFRESH_FAILED",
            Self::NetworkTimeout => "NETWORK_TIMEOUT",
            Self::Validation => "VALIDATION_ERROR",
            Self::CurrentSession => "CANNOT_REVOKE_CURRENT",
            Self::NotFound => "NOT_FOUND",
            Self::Configuration | Self::Internal => "SERVER_ERROR",
        }
    }

    /// Whether this kind means the caller's credential is not (or no longer) usable.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::NoToken
                | Self::MalformedToken
                | Self::ExpiredToken
                | Self::BlacklistedToken
                | Self::SessionExpired
                | Self::InvalidAccount
                | Self::InvalidCredentials
                | Self::NoRefreshToken
                | Self::RefreshFailed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout Folio.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the stable wire code.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn no_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoToken, message)
    }

    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedToken, message)
    }

    pub fn expired_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredToken, message)
    }

    pub fn blacklisted_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BlacklistedToken, message)
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionExpired, message)
    }

    pub fn invalid_account(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidAccount, message)
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn no_refresh_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoRefreshToken, message)
    }

    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RefreshFailed, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a configuration error. Fatal at start-up.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
