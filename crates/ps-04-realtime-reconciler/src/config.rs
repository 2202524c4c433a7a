//! # Reconciler Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Realtime reconciler configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Automatic resubscribes after the event stream drops, before the
    /// snapshot is marked stale.
    pub max_resubscribe_attempts: u32,

    /// Pause before each resubscribe, in milliseconds.
    pub resubscribe_backoff_ms: u64,

    /// Emit "new arrival" notices while broadcasting.
    pub arrival_notifications: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_resubscribe_attempts: 1,
            resubscribe_backoff_ms: 500,
            arrival_notifications: true,
        }
    }
}

impl ReconcilerConfig {
    /// Create a config for testing (no real backoff).
    pub fn for_testing() -> Self {
        Self {
            resubscribe_backoff_ms: 5,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn resubscribe_backoff(&self) -> Duration {
        Duration::from_millis(self.resubscribe_backoff_ms)
    }
}
