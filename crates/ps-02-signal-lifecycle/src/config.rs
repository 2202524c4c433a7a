//! # Lifecycle Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Signal lifecycle configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Lifetime of a signal from creation or extension, in seconds.
    pub signal_ttl_secs: u64,

    /// Maximum location description length in characters (after trimming).
    pub max_description_len: usize,

    /// Upper bound on the expiry watcher's sleep, in milliseconds.
    pub expiry_poll_interval_ms: u64,

    /// Buffered lifecycle events per listener.
    pub event_channel_capacity: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            signal_ttl_secs: 2 * 60 * 60,
            max_description_len: 120,
            expiry_poll_interval_ms: 30_000,
            event_channel_capacity: 64,
        }
    }
}

impl LifecycleConfig {
    /// Create a config for testing (fast polling).
    pub fn for_testing() -> Self {
        Self {
            expiry_poll_interval_ms: 10,
            event_channel_capacity: 16,
            ..Self::default()
        }
    }

    /// Signal lifetime.
    #[must_use]
    pub fn signal_ttl(&self) -> Duration {
        Duration::from_secs(self.signal_ttl_secs)
    }

    /// Watcher poll bound.
    #[must_use]
    pub fn expiry_poll_interval(&self) -> Duration {
        Duration::from_millis(self.expiry_poll_interval_ms)
    }
}
