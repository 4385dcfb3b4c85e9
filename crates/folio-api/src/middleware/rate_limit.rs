//! Token bucket rate limiter middleware.
//!
//! One bucket per client IP. The health check is exempt so monitors are
//! never throttled.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tracing::warn;

use folio_core::config::RateLimitConfig;
use folio_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client::{RequestId, client_ip};
use crate::state::AppState;

const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Simple in-memory token bucket rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// IP → bucket state.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Maximum tokens per bucket.
    max_tokens: u32,
    /// Token refill rate per second.
    refill_rate: f64,
    enabled: bool,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(max_tokens: u32, refill_rate: f64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            max_tokens,
            refill_rate,
            enabled: true,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.requests_per_window, config.refill_per_second())
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Attempts to consume a token for the given key.
    ///
    /// On refusal returns how long until the next token is available.
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        if buckets.len() >= MAX_TRACKED_CLIENTS && !buckets.contains_key(key) {
            let full_after = self.max_tokens as f64 / self.refill_rate.max(f64::EPSILON);
            buckets.retain(|_, b| now.duration_since(b.last_refill).as_secs_f64() < full_after);
        }

        let bucket = buckets.entry(key.to_string()).or_insert(TokenBucket {
            tokens: self.max_tokens as f64,
            last_refill: now,
        });

        // Refill tokens
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(
                missing / self.refill_rate.max(f64::EPSILON),
            ))
        }
    }
}

/// Rejects clients that exhausted their bucket with `429 RATE_LIMITED`.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let limiter = &state.rate_limiter;
    if !limiter.is_enabled() || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.config.server.trust_proxy_headers,
    );
    match limiter.check(&ip).await {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
            ApiError::new(
                AppError::rate_limited("Too many requests, please try again later."),
                RequestId::from_headers(request.headers()),
            )
            .with_retry_after(wait.as_secs().max(1))
            .into_response()
        }
    }
}
