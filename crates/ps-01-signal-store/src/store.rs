//! # In-Memory Signal Store
//!
//! The persistence/RPC backend every client talks to. All tables live
//! behind one mutex so that check-then-write operations (creation limit,
//! reveal check-and-log) are atomic. Change events are published after the
//! lock is released.

use crate::config::StoreConfig;
use crate::domain::{CreationLedger, RevealLog, StoreError};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, RealtimeEvent, SignalChange};
use shared_types::{
    bounding_box, Coordinates, ExtendedProfile, NearbySignalRow, PublicProfile, RatingSnapshot, Signal,
    TimeSource, Timestamp, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};


/// Operations that can be failed on purpose to exercise fallbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultInjection {
    /// Fail `query_nearby_signals`.
    pub aggregate_queries: bool,
    /// Fail `query_raw_signals` and `resolve_public_profiles`.
    pub raw_queries: bool,
    /// Fail signal writes and deletes.
    pub writes: bool,
    /// Fail `get_ghost_mode`.
    pub ghost_lookups: bool,
    /// Fail `check_and_log_reveal`.
    pub reveal_checks: bool,
}

impl FaultInjection {
    /// No faults.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Every operation fails.
    #[must_use]
    pub fn total_outage() -> Self {
        Self {
            aggregate_queries: true,
            raw_queries: true,
            writes: true,
            ghost_lookups: true,
            reveal_checks: true,
        }
    }
}

#[derive(Debug, Clone)]
struct ProfileRecord {
    profile: ExtendedProfile,
    ghost_mode: bool,
}

#[derive(Debug, Default)]
struct Tables {
    signals: HashMap<UserId, Signal>,
    profiles: HashMap<UserId, ProfileRecord>,
    creations: CreationLedger,
    reveals: RevealLog,
}

/// Authoritative in-memory store.
pub struct InMemorySignalStore {
    config: StoreConfig,
    tables: Mutex<Tables>,
    faults: Mutex<FaultInjection>,
    publisher: Arc<dyn EventPublisher>,
    time_source: Arc<dyn TimeSource>,
}

impl InMemorySignalStore {
    /// Create a store that publishes change events on `publisher`.
    pub fn new(
        config: StoreConfig,
        publisher: Arc<dyn EventPublisher>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            tables: Mutex::new(Tables::default()),
            faults: Mutex::new(FaultInjection::none()),
            publisher,
            time_source,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Replace the fault plan.
    pub fn inject_faults(&self, faults: FaultInjection) {
        if faults != FaultInjection::none() {
            warn!(?faults, "Store fault injection enabled");
        }
        *self.faults.lock() = faults;
    }

    fn fail_if(&self, check: impl Fn(&FaultInjection) -> bool, op: &str) -> Result<(), StoreError> {
        let faults = *self.faults.lock();
        if check(&faults) {
            debug!(op, "Injected store failure");
            return Err(StoreError::Unavailable(format!("{op} unavailable")));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    /// Insert or replace a profile row. Ghost mode is preserved.
    pub fn put_profile(&self, profile: ExtendedProfile) {
        let mut tables = self.tables.lock();
        let ghost_mode = tables
            .profiles
            .get(&profile.user_id)
            .is_some_and(|r| r.ghost_mode);
        tables.profiles.insert(
            profile.user_id.clone(),
            ProfileRecord {
                profile,
                ghost_mode,
            },
        );
    }

    /// Ghost-mode flag; unknown users are visible.
    pub async fn get_ghost_mode(&self, owner: &UserId) -> Result<bool, StoreError> {
        self.fail_if(|f| f.ghost_lookups, "get_ghost_mode")?;
        Ok(self
            .tables
            .lock()
            .profiles
            .get(owner)
            .is_some_and(|r| r.ghost_mode))
    }

    /// Toggle ghost mode and publish a profile change event.
    pub async fn set_ghost_mode(&self, owner: &UserId, enabled: bool) -> Result<(), StoreError> {
        self.fail_if(|f| f.writes, "set_ghost_mode")?;
        {
            let mut tables = self.tables.lock();
            let record = tables
                .profiles
                .entry(owner.clone())
                .or_insert_with(|| ProfileRecord {
                    profile: ExtendedProfile {
                        user_id: owner.clone(),
                        display_name: self.config.fallback_display_name.clone(),
                        bio: String::new(),
                        interests: Vec::new(),
                        rating: RatingSnapshot::default(),
                    },
                    ghost_mode: false,
                });
            if record.ghost_mode == enabled {
                return Ok(());
            }
            record.ghost_mode = enabled;
        }
        info!(owner = %owner, enabled, "Ghost mode changed");
        self.publisher
            .publish(RealtimeEvent::GhostModeChanged {
                owner_id: owner.clone(),
                enabled,
            })
            .await;
        Ok(())
    }

    /// Public profiles for `ids`; unknown ids are skipped.
    pub async fn resolve_public_profiles(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<PublicProfile>, StoreError> {
        self.fail_if(|f| f.raw_queries, "resolve_public_profiles")?;
        let tables = self.tables.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.profiles.get(id))
            .map(|r| PublicProfile {
                user_id: r.profile.user_id.clone(),
                display_name: r.profile.display_name.clone(),
                rating: r.profile.rating,
            })
            .collect())
    }

    /// Extended profile of `target` as seen by `viewer`.
    ///
    /// A ghost-mode target is hidden from everyone but themselves.
    pub async fn fetch_extended_profile(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<Option<ExtendedProfile>, StoreError> {
        self.fail_if(|f| f.raw_queries, "fetch_extended_profile")?;
        let tables = self.tables.lock();
        match tables.profiles.get(target) {
            Some(record) if record.ghost_mode && viewer != target => {
                Err(StoreError::Hidden(target.clone()))
            }
            Some(record) => Ok(Some(record.profile.clone())),
            None => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Signals
    // -------------------------------------------------------------------------

    /// Whether `owner` may create another signal now.
    pub async fn check_signal_creation_rate_limit(&self, owner: &UserId) -> Result<bool, StoreError> {
        self.fail_if(|f| f.writes, "check_signal_creation_rate_limit")?;
        let now = self.time_source.now();
        let window = self.config.creation_window();
        let count = self.tables.lock().creations.count_recent(owner, now, window);
        let allowed = count < self.config.creation_limit as usize;
        debug!(owner = %owner, count, allowed, "Creation rate limit checked");
        Ok(allowed)
    }

    /// Time until `owner` regains a creation slot, if currently exhausted.
    pub fn creation_retry_after(&self, owner: &UserId) -> Option<Duration> {
        let now = self.time_source.now();
        let window = self.config.creation_window();
        let mut tables = self.tables.lock();
        if tables.creations.count_recent(owner, now, window) < self.config.creation_limit as usize {
            return None;
        }
        tables.creations.retry_after(owner, now, window)
    }

    /// Insert or update the owner's signal.
    ///
    /// An insert (no live row for the owner) records a creation ledger entry
    /// and is rejected when the ledger is full. Updates are free.
    pub async fn upsert_signal(&self, signal: Signal) -> Result<(), StoreError> {
        self.fail_if(|f| f.writes, "upsert_signal")?;
        if !signal.coordinates.is_valid() {
            return Err(StoreError::InvalidCoordinates(format!(
                "({}, {})",
                signal.coordinates.latitude, signal.coordinates.longitude
            )));
        }

        let now = self.time_source.now();
        let window = self.config.creation_window();
        let owner = signal.owner_id.clone();

        let change = {
            let mut tables = self.tables.lock();
            let previous = tables.signals.get(&owner).cloned();
            let is_creation = previous.as_ref().map_or(true, |s| s.is_expired(now));

            if is_creation {
                let count = tables.creations.count_recent(&owner, now, window);
                if count >= self.config.creation_limit as usize {
                    let retry_after = tables.creations.retry_after(&owner, now, window);
                    warn!(owner = %owner, count, "Signal creation rejected by ledger");
                    return Err(StoreError::CreationLimitReached { owner, retry_after });
                }
                tables.creations.record(&owner, now);
            }

            tables.signals.insert(owner.clone(), signal.clone());
            match previous {
                Some(old) => SignalChange::update(old, signal),
                None => SignalChange::insert(signal),
            }
        };

        debug!(owner = %owner, kind = ?change.kind, "Signal upserted");
        self.publisher
            .publish(RealtimeEvent::SignalChanged(change))
            .await;
        Ok(())
    }

    /// Remove the owner's signal. Returns whether a row existed.
    pub async fn delete_signal(&self, owner: &UserId) -> Result<bool, StoreError> {
        self.fail_if(|f| f.writes, "delete_signal")?;
        let removed = self.tables.lock().signals.remove(owner);
        let Some(old) = removed else {
            return Ok(false);
        };
        debug!(owner = %owner, "Signal deleted");
        self.publisher
            .publish(RealtimeEvent::SignalChanged(SignalChange::delete(old)))
            .await;
        Ok(true)
    }

    /// Privacy-filtered aggregate query.
    ///
    /// Returns live, non-ghost signals other than the requester's inside a
    /// bounding box of at least `prefilter_radius_m`. Exact distance
    /// filtering is left to the caller.
    pub async fn query_nearby_signals(
        &self,
        requester: &UserId,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Vec<NearbySignalRow>, StoreError> {
        self.fail_if(|f| f.aggregate_queries, "query_nearby_signals")?;
        let now = self.time_source.now();
        let center = Coordinates::new(latitude, longitude);
        let bbox = bounding_box(&center, radius_m.max(self.config.prefilter_radius_m));

        let tables = self.tables.lock();
        let rows: Vec<NearbySignalRow> = tables
            .signals
            .values()
            .filter(|s| &s.owner_id != requester)
            .filter(|s| !s.is_expired(now))
            .filter(|s| bbox.contains(&s.coordinates))
            .filter_map(|s| {
                let profile = tables.profiles.get(&s.owner_id);
                if profile.is_some_and(|r| r.ghost_mode) {
                    return None;
                }
                Some(NearbySignalRow {
                    signal: s.clone(),
                    display_name: profile.map_or_else(
                        || self.config.fallback_display_name.clone(),
                        |r| r.profile.display_name.clone(),
                    ),
                    rating: profile.map(|r| r.profile.rating).unwrap_or_default(),
                })
            })
            .collect();

        debug!(requester = %requester, rows = rows.len(), "Aggregate nearby query");
        Ok(rows)
    }

    /// Raw signal rows, excluding one owner and anything expired at
    /// `not_expired_before`. Not privacy-filtered.
    pub async fn query_raw_signals(
        &self,
        exclude_owner: &UserId,
        not_expired_before: Timestamp,
    ) -> Result<Vec<Signal>, StoreError> {
        self.fail_if(|f| f.raw_queries, "query_raw_signals")?;
        let tables = self.tables.lock();
        Ok(tables
            .signals
            .values()
            .filter(|s| &s.owner_id != exclude_owner)
            .filter(|s| !s.is_expired(not_expired_before))
            .cloned()
            .collect())
    }

    /// Physically remove expired rows, publishing a delete for each.
    pub async fn purge_expired(&self) -> usize {
        let now = self.time_source.now();
        let purged: Vec<Signal> = {
            let mut tables = self.tables.lock();
            let expired: Vec<UserId> = tables
                .signals
                .values()
                .filter(|s| s.is_expired(now))
                .map(|s| s.owner_id.clone())
                .collect();
            expired
                .iter()
                .filter_map(|id| tables.signals.remove(id))
                .collect()
        };

        let count = purged.len();
        for old in purged {
            self.publisher
                .publish(RealtimeEvent::SignalChanged(SignalChange::delete(old)))
                .await;
        }
        if count > 0 {
            info!(count, "Purged expired signals");
        }
        count
    }

    /// Current row for `owner`, expired or not.
    pub fn signal(&self, owner: &UserId) -> Option<Signal> {
        self.tables.lock().signals.get(owner).cloned()
    }

    /// Number of physical signal rows.
    pub fn signal_count(&self) -> usize {
        self.tables.lock().signals.len()
    }

    // -------------------------------------------------------------------------
    // Reveals
    // -------------------------------------------------------------------------

    /// Atomically check the per-pair reveal cap and, if allowed, log it.
    ///
    /// A ghost-mode target is refused with [`StoreError::Hidden`] in the
    /// same step, so a hidden profile never costs the viewer a reveal.
    pub async fn check_and_log_reveal(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<bool, StoreError> {
        self.fail_if(|f| f.reveal_checks, "check_and_log_reveal")?;
        let now = self.time_source.now();
        let window = self.config.reveal_window();

        let mut tables = self.tables.lock();
        if viewer != target && tables.profiles.get(target).is_some_and(|r| r.ghost_mode) {
            debug!(viewer = %viewer, target = %target, "Reveal refused, target hidden");
            return Err(StoreError::Hidden(target.clone()));
        }
        let recent = tables.reveals.recent_count(viewer, target, now, window);
        let allowed = recent < self.config.reveal_cap_per_pair as usize;
        if allowed {
            tables.reveals.record(viewer, target, now);
        }
        debug!(viewer = %viewer, target = %target, allowed, "Reveal checked");
        Ok(allowed)
    }

    /// Time until the pair's most recent reveal leaves the window.
    pub fn reveal_retry_after(&self, viewer: &UserId, target: &UserId) -> Option<Duration> {
        let now = self.time_source.now();
        let window = self.config.reveal_window();
        let tables = self.tables.lock();
        tables
            .reveals
            .last(viewer, target)
            .map(|at| now.duration_until(at.saturating_add(window)))
            .filter(|d| !d.is_zero())
    }

    /// Logged reveals for the ordered pair.
    pub fn reveal_entries(&self, viewer: &UserId, target: &UserId) -> usize {
        self.tables.lock().reveals.entries_for(viewer, target)
    }
}
