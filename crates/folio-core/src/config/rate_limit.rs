//! Request and login rate limiting configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the per-IP request limiter is active.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests allowed per client IP within one window.
    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: u32,
    /// Length of the request window in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Failed logins per IP and email before further attempts are refused.
    #[serde(default = "default_login_max_failures")]
    pub login_max_failures: u32,
    /// Minutes after the last failure until the failure counter resets.
    #[serde(default = "default_login_window")]
    pub login_window_minutes: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_window: default_requests_per_window(),
            window_seconds: default_window(),
            login_max_failures: default_login_max_failures(),
            login_window_minutes: default_login_window(),
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.enabled && (self.requests_per_window == 0 || self.window_seconds == 0) {
            return Err(AppError::configuration(
                "rate_limit.requests_per_window and rate_limit.window_seconds must be positive",
            ));
        }
        if self.login_max_failures == 0 {
            return Err(AppError::configuration(
                "rate_limit.login_max_failures must be positive",
            ));
        }
        Ok(())
    }

    /// Token refill rate per second of the request bucket.
    pub fn refill_per_second(&self) -> f64 {
        self.requests_per_window as f64 / self.window_seconds.max(1) as f64
    }
}

fn default_true() -> bool {
    true
}

fn default_requests_per_window() -> u32 {
    100
}

fn default_window() -> u64 {
    900
}

fn default_login_max_failures() -> u32 {
    5
}

fn default_login_window() -> u64 {
    15
}
