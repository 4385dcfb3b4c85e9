//! Authentication configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Token signing and admin credential configuration.
///
/// The signing secret and the admin credentials have no defaults: a server
/// without them refuses to start.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// `iss` claim written into and required from every token.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// `aud` claim written into and required from every token.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Hard ceiling on token age in hours, independent of `exp`.
    #[serde(default = "default_max_age")]
    pub max_age_hours: u64,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Email of the single admin account.
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Password of the single admin account.
    #[serde(default)]
    pub admin_password: Option<String>,
    /// Lower bound of the randomized login response time in milliseconds.
    #[serde(default = "default_login_delay_min")]
    pub login_delay_min_ms: u64,
    /// Upper bound of the randomized login response time in milliseconds.
    #[serde(default = "default_login_delay_max")]
    pub login_delay_max_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: default_issuer(),
            audience: default_audience(),
            token_ttl_hours: default_token_ttl(),
            max_age_hours: default_max_age(),
            leeway_seconds: default_leeway(),
            admin_email: None,
            admin_password: None,
            login_delay_min_ms: default_login_delay_min(),
            login_delay_max_ms: default_login_delay_max(),
        }
    }
}

impl AuthConfig {
    /// Returns the signing secret, rejecting absent or blank values.
    pub fn secret(&self) -> AppResult<&str> {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(AppError::configuration(
                "No token signing secret configured (auth.jwt_secret)",
            )),
        }
    }

    /// Checks that everything the server needs at start-up is present.
    pub fn validate(&self) -> AppResult<()> {
        self.secret()?;

        let email_missing = self.admin_email.as_deref().is_none_or(|e| e.trim().is_empty());
        let password_missing = self.admin_password.as_deref().is_none_or(str::is_empty);
        if email_missing || password_missing {
            return Err(AppError::configuration(
                "Admin credentials not configured (auth.admin_email / auth.admin_password)",
            ));
        }

        if self.max_age_hours < self.token_ttl_hours {
            return Err(AppError::configuration(
                "auth.max_age_hours must be at least auth.token_ttl_hours",
            ));
        }

        if self.login_delay_min_ms > self.login_delay_max_ms {
            return Err(AppError::configuration(
                "auth.login_delay_min_ms must not exceed auth.login_delay_max_ms",
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("max_age_hours", &self.max_age_hours)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("login_delay_min_ms", &self.login_delay_min_ms)
            .field("login_delay_max_ms", &self.login_delay_max_ms)
            .finish()
    }
}

fn default_issuer() -> String {
    "portfolio-app".to_string()
}

fn default_audience() -> String {
    "portfolio-app-users".to_string()
}

fn default_token_ttl() -> u64 {
    24
}

fn default_max_age() -> u64 {
    24
}

fn default_leeway() -> u64 {
    5
}

fn default_login_delay_min() -> u64 {
    1000
}

fn default_login_delay_max() -> u64 {
    2000
}
