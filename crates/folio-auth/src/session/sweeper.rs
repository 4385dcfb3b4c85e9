//! Background eviction of expired blacklist entries and timed-out sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::blacklist::TokenBlacklist;

use super::store::SessionStore;

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub tokens: usize,
    pub sessions: usize,
}

/// Periodic cleanup task.
#[derive(Debug, Clone)]
pub struct Sweeper {
    sessions: Arc<SessionStore>,
    blacklist: Arc<TokenBlacklist>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(sessions: Arc<SessionStore>, blacklist: Arc<TokenBlacklist>, interval: Duration) -> Self {
        Self {
            sessions,
            blacklist,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// Runs one cleanup cycle.
    pub fn run_once(&self) -> SweepReport {
        let report = SweepReport {
            tokens: self.blacklist.purge_expired(),
            sessions: self.sessions.purge_expired(Utc::now()),
        };
        if report != SweepReport::default() {
            info!(
                tokens = report.tokens,
                sessions = report.sessions,
                "Sweep removed expired entries"
            );
        }
        report
    }

    /// Sweeps on every tick until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Sweeper stopped");
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
