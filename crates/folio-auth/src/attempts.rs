//! Failed login tracking per client.
//!
//! Failures are counted per `ip-email` pair. Once the limit is reached the
//! pair is locked out until the window passes without further failures;
//! a successful login clears the counter.

use std::time::Duration;

use moka::future::Cache;

use folio_core::config::RateLimitConfig;

use crate::credentials::normalize_email;

/// Counts failed logins with a sliding expiry.
#[derive(Clone)]
pub struct LoginAttemptTracker {
    failures: Cache<String, u32>,
    max_failures: u32,
}

impl std::fmt::Debug for LoginAttemptTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginAttemptTracker")
            .field("max_failures", &self.max_failures)
            .field("tracked", &self.failures.entry_count())
            .finish()
    }
}

impl LoginAttemptTracker {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_window(
            config.login_max_failures,
            Duration::from_secs(config.login_window_minutes * 60),
        )
    }

    pub fn with_window(max_failures: u32, window: Duration) -> Self {
        Self {
            failures: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(window)
                .build(),
            max_failures,
        }
    }

    /// Tracking key for a client IP and login email.
    pub fn key(ip: &str, email: &str) -> String {
        format!("{ip}-{}", normalize_email(email))
    }

    /// Whether the key has used up its failures.
    pub async fn is_locked(&self, key: &str) -> bool {
        self.failures
            .get(key)
            .await
            .is_some_and(|count| count >= self.max_failures)
    }

    /// Counts one failure and returns the new total.
    pub async fn record_failure(&self, key: &str) -> u32 {
        let entry = self
            .failures
            .entry(key.to_string())
            .and_upsert_with(|existing| {
                let count = existing.map(|e| e.into_value()).unwrap_or(0);
                std::future::ready(count.saturating_add(1))
            })
            .await;
        entry.into_value()
    }

    pub async fn clear(&self, key: &str) {
        self.failures.invalidate(key).await;
    }

    /// Configured failure limit.
    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }
}
