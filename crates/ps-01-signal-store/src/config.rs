//! # Signal Store Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authoritative limits and query tuning for the signal store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Signal creations allowed per owner per rolling window.
    pub creation_limit: u32,

    /// Rolling window for the creation ledger, in seconds.
    pub creation_window_secs: u64,

    /// Reveals allowed per ordered (viewer, target) pair per window.
    pub reveal_cap_per_pair: u32,

    /// Rolling window for the reveal log, in seconds.
    pub reveal_window_secs: u64,

    /// Minimum bounding-box radius used by the aggregate query pre-filter.
    pub prefilter_radius_m: f64,

    /// Display name used for signals whose owner has no profile row.
    pub fallback_display_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            creation_limit: 10,
            creation_window_secs: 3_600,
            reveal_cap_per_pair: 1,
            reveal_window_secs: 3_600,
            prefilter_radius_m: 1_000.0,
            fallback_display_name: "Anonymous".to_string(),
        }
    }
}

impl StoreConfig {
    /// Create a config for testing (smaller windows).
    pub fn for_testing() -> Self {
        Self {
            creation_limit: 3,
            creation_window_secs: 60,
            reveal_cap_per_pair: 1,
            reveal_window_secs: 60,
            ..Self::default()
        }
    }

    /// Creation window as a duration.
    #[must_use]
    pub fn creation_window(&self) -> Duration {
        Duration::from_secs(self.creation_window_secs)
    }

    /// Reveal window as a duration.
    #[must_use]
    pub fn reveal_window(&self) -> Duration {
        Duration::from_secs(self.reveal_window_secs)
    }
}
