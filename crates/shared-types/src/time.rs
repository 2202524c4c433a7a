//! # Time
//!
//! Absolute wall-clock timestamps and the `TimeSource` port.
//!
//! Expiration and lockout deadlines are stored as absolute `Timestamp`s and
//! compared against `TimeSource::now()`, never accumulated from elapsed
//! durations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from milliseconds since the epoch.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Create a timestamp from seconds since the epoch.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `duration`.
    #[must_use]
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// This timestamp shifted backward by `duration`.
    #[must_use]
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_sub(millis))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    #[must_use]
    pub fn duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Time remaining until `later`, zero if `later` has passed.
    #[must_use]
    pub fn duration_until(&self, later: Timestamp) -> Duration {
        later.duration_since(*self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Abstract interface for reading the wall clock.
///
/// Production implementations use system time; tests use `ManualClock`.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// `TimeSource` backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Timestamp::from_millis(millis)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-utils"))]
mod manual {
    use super::{TimeSource, Timestamp};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// Thread-safe clock for tests requiring time advancement.
    #[derive(Debug, Default)]
    pub struct ManualClock {
        millis: AtomicU64,
    }

    impl ManualClock {
        /// Create a clock frozen at `start`.
        #[must_use]
        pub fn new(start: Timestamp) -> Self {
            Self {
                millis: AtomicU64::new(start.as_millis()),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
            self.millis.fetch_add(millis, Ordering::SeqCst);
        }

        /// Jump to an absolute time (also backwards, to simulate clock drift).
        pub fn set(&self, to: Timestamp) {
            self.millis.store(to.as_millis(), Ordering::SeqCst);
        }
    }

    impl TimeSource for ManualClock {
        fn now(&self) -> Timestamp {
            Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
        }
    }
}
