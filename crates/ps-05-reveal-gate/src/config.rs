//! # Reveal Gate Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reveal gate configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Retry-after reported on a denial when the ledger cannot estimate one.
    pub default_cooldown_secs: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            default_cooldown_secs: 60 * 60,
        }
    }
}

impl RevealConfig {
    /// Create a config for testing (one-minute cooldown).
    pub fn for_testing() -> Self {
        Self {
            default_cooldown_secs: 60,
        }
    }

    #[must_use]
    pub fn default_cooldown(&self) -> Duration {
        Duration::from_secs(self.default_cooldown_secs)
    }
}
