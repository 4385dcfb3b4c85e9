//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle timeout in minutes before a session is swept (`0` disables).
    #[serde(default)]
    pub idle_timeout_minutes: u64,
    /// Absolute session lifetime in hours regardless of activity (`0` disables).
    #[serde(default = "default_absolute_timeout")]
    pub absolute_timeout_hours: u64,
    /// Interval of the background sweep over sessions and the token blacklist.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 0,
            absolute_timeout_hours: default_absolute_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_absolute_timeout() -> u64 {
    168
}

fn default_sweep_interval() -> u64 {
    60
}
