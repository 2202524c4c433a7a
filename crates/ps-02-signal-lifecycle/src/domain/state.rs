//! # Lifecycle State
//!
//! `Inactive → Active(green|yellow|red) → Inactive`. The signal state lives
//! inside the active `Signal`.

use shared_types::{Signal, Timestamp};

/// Local view of the user's own broadcast.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    #[default]
    Inactive,
    Active(Signal),
}

impl LifecycleState {
    /// The active signal, if any.
    #[must_use]
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            Self::Active(signal) => Some(signal),
            Self::Inactive => None,
        }
    }

    /// The active signal only if it has not yet expired at `now`.
    #[must_use]
    pub fn live_signal(&self, now: Timestamp) -> Option<&Signal> {
        self.signal().filter(|s| !s.is_expired(now))
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}
