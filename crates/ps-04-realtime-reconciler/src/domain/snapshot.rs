//! Latest recomputed nearby list, as published to watchers.

use ps_03_proximity_query::{NearbyResult, QueryTier};
use shared_types::Timestamp;

/// What the UI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySnapshot {
    pub result: NearbyResult,
    /// Realtime delivery gave up; `result` is the last known state.
    pub stale: bool,
    /// Session generation that produced this snapshot.
    pub generation: u64,
    pub computed_at: Timestamp,
}

impl NearbySnapshot {
    /// Snapshot for a session with nothing computed yet.
    #[must_use]
    pub fn idle(generation: u64, at: Timestamp) -> Self {
        Self {
            result: NearbyResult::empty(QueryTier::Skipped),
            stale: false,
            generation,
            computed_at: at,
        }
    }

    #[must_use]
    pub fn demo_mode(&self) -> bool {
        self.result.demo_mode
    }
}
