//! # Authoritative Ledgers
//!
//! Server-side records that back the creation limit and the reveal cap.
//! Both are rolling windows over absolute timestamps.

use shared_types::{Timestamp, UserId};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Per-owner signal creation history.
#[derive(Debug, Default)]
pub struct CreationLedger {
    entries: HashMap<UserId, VecDeque<Timestamp>>,
}

impl CreationLedger {
    /// Drop entries older than `window` and return how many remain.
    pub fn count_recent(&mut self, owner: &UserId, now: Timestamp, window: Duration) -> usize {
        let Some(times) = self.entries.get_mut(owner) else {
            return 0;
        };
        let cutoff = now.saturating_sub(window);
        while times.front().is_some_and(|t| *t <= cutoff) {
            times.pop_front();
        }
        let count = times.len();
        if count == 0 {
            self.entries.remove(owner);
        }
        count
    }

    /// Record a creation at `now`.
    pub fn record(&mut self, owner: &UserId, now: Timestamp) {
        self.entries.entry(owner.clone()).or_default().push_back(now);
    }

    /// Time until the oldest in-window entry ages out.
    #[must_use]
    pub fn retry_after(&self, owner: &UserId, now: Timestamp, window: Duration) -> Option<Duration> {
        self.entries
            .get(owner)
            .and_then(|times| times.front())
            .map(|oldest| now.duration_until(oldest.saturating_add(window)))
    }
}

type Pair = (UserId, UserId);

/// Reveal history keyed by ordered (viewer, target) pair.
///
/// In-window timestamps are pruned as they age out; a lifetime count per
/// pair is kept for auditing.
#[derive(Debug, Default)]
pub struct RevealLog {
    recent: HashMap<Pair, VecDeque<Timestamp>>,
    lifetime: HashMap<Pair, usize>,
}

impl RevealLog {
    /// Drop the pair's entries older than `window` and return how many remain.
    pub fn recent_count(
        &mut self,
        viewer: &UserId,
        target: &UserId,
        now: Timestamp,
        window: Duration,
    ) -> usize {
        let pair = (viewer.clone(), target.clone());
        let Some(times) = self.recent.get_mut(&pair) else {
            return 0;
        };
        let cutoff = now.saturating_sub(window);
        while times.front().is_some_and(|t| *t <= cutoff) {
            times.pop_front();
        }
        let count = times.len();
        if count == 0 {
            self.recent.remove(&pair);
        }
        count
    }

    /// Log an allowed reveal at `now`.
    pub fn record(&mut self, viewer: &UserId, target: &UserId, now: Timestamp) {
        let pair = (viewer.clone(), target.clone());
        *self.lifetime.entry(pair.clone()).or_default() += 1;
        self.recent.entry(pair).or_default().push_back(now);
    }

    /// Most recent in-window reveal for the ordered pair.
    #[must_use]
    pub fn last(&self, viewer: &UserId, target: &UserId) -> Option<Timestamp> {
        self.recent
            .get(&(viewer.clone(), target.clone()))
            .and_then(|times| times.back().copied())
    }

    /// Reveals ever logged for the ordered pair.
    #[must_use]
    pub fn entries_for(&self, viewer: &UserId, target: &UserId) -> usize {
        self.lifetime
            .get(&(viewer.clone(), target.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Pairs with at least one in-window reveal.
    #[must_use]
    pub fn tracked_pairs(&self) -> usize {
        self.recent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lifetime.is_empty()
    }
}
