//! Revoked tokens that must stop working before their natural expiry.
//!
//! Membership is by exact token string. Entries are kept only until the
//! token's own `exp`: after that the codec rejects the token anyway. A
//! min-heap ordered by expiry lets the sweeper drop stale entries without
//! scanning, and lookups compare against the clock so an entry stops
//! counting at `exp` even between sweeps.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use crate::token::peek_expiry;

/// Set of revoked tokens with expiry-ordered eviction.
#[derive(Debug, Default)]
pub struct TokenBlacklist {
    entries: DashMap<String, i64>,
    expiries: Mutex<BinaryHeap<Reverse<(i64, String)>>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blacklists `token` until its `exp`.
    ///
    /// Malformed or already expired tokens are ignored and `false` is
    /// returned; they can never be accepted again anyway.
    pub fn add(&self, token: &str) -> bool {
        self.add_at(token, Utc::now().timestamp())
    }

    /// [`TokenBlacklist::add`] with an explicit clock.
    pub fn add_at(&self, token: &str, now: i64) -> bool {
        let Some(exp) = peek_expiry(token) else {
            debug!("Ignoring malformed token for blacklist");
            return false;
        };
        if exp <= now {
            return false;
        }

        if self.entries.insert(token.to_string(), exp).is_none() {
            self.expiries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Reverse((exp, token.to_string())));
        }
        true
    }

    pub fn is_blacklisted(&self, token: &str) -> bool {
        self.is_blacklisted_at(token, Utc::now().timestamp())
    }

    /// [`TokenBlacklist::is_blacklisted`] with an explicit clock.
    pub fn is_blacklisted_at(&self, token: &str, now: i64) -> bool {
        self.entries.get(token).is_some_and(|exp| *exp > now)
    }

    /// Drops every entry whose token has expired. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now().timestamp())
    }

    /// [`TokenBlacklist::purge_expired`] with an explicit clock.
    pub fn purge_expired_at(&self, now: i64) -> usize {
        let mut heap = self.expiries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut purged = 0;
        while let Some(Reverse((exp, _))) = heap.peek() {
            if *exp > now {
                break;
            }
            if let Some(Reverse((_, token))) = heap.pop() {
                if self.entries.remove(&token).is_some() {
                    purged += 1;
                }
            }
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
