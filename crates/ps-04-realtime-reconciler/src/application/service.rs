//! # Realtime Reconciler
//!
//! Keeps one requester's nearby list current. Every signal or ghost-mode
//! event triggers a full recompute through the query service; nothing is
//! patched incrementally, so duplicated or reordered delivery is harmless.
//!
//! While the requester broadcasts, insert/update payloads also go through
//! the arrival path, which announces each new identity once per
//! broadcast session.
//!
//! Snapshots are emitted under the session lock after checking the session
//! generation. Arrival notices are delivered under a separate delivery lock
//! with the session lock released, so a notifier may read reconciler state.
//! `unsubscribe` and `end_arrivals` bump the generation or epoch and then
//! wait out any in-flight delivery, so nothing is emitted once they return.

use crate::config::ReconcilerConfig;
use crate::domain::{screen_arrival, ArrivalNotice, ArrivalScreen, KnownUsersSet, NearbySnapshot};
use crate::ports::{ArrivalNotifier, RealtimeReconcilerApi};
use async_trait::async_trait;
use parking_lot::{Mutex, ReentrantMutex};
use ps_03_proximity_query::{GhostModeLookup, NearbyQuery, ProximityQueryApi};
use shared_bus::{
    ChangeKind, EventFilter, EventSubscriber, RealtimeEvent, Subscription, SubscriptionError,
};
use shared_types::{
    PositionProvider, PreferenceStore, ProximityError, Signal, TimeSource, UserId,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};


#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    requester: Option<UserId>,
    arrivals_enabled: bool,
    arrival_epoch: u64,
    known: KnownUsersSet,
}

struct Core {
    config: ReconcilerConfig,
    events: Arc<dyn EventSubscriber>,
    query: Arc<dyn ProximityQueryApi>,
    ghost_mode: Arc<dyn GhostModeLookup>,
    notifier: Arc<dyn ArrivalNotifier>,
    position: Arc<dyn PositionProvider>,
    preferences: Arc<dyn PreferenceStore>,
    time_source: Arc<dyn TimeSource>,
    session: Mutex<SessionState>,
    // Reentrant so a notifier may end arrivals from inside `notify`.
    delivery: ReentrantMutex<()>,
    snapshot: watch::Sender<NearbySnapshot>,
}

fn event_filter() -> EventFilter {
    EventFilter::signals(vec![ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete])
        .with_profiles()
}

impl Core {
    fn is_current(&self, generation: u64) -> bool {
        self.session.lock().generation == generation
    }

    fn emit_snapshot(&self, snapshot: NearbySnapshot) -> bool {
        let session = self.session.lock();
        if session.generation != snapshot.generation {
            return false;
        }
        self.snapshot.send_replace(snapshot);
        true
    }

    fn mark_stale(&self, generation: u64) {
        let session = self.session.lock();
        if session.generation == generation {
            self.snapshot.send_modify(|s| s.stale = true);
            warn!(generation, "Realtime delivery lost, nearby list is stale");
        }
    }

    /// Subscribe, retrying up to the configured number of times.
    async fn open_subscription(&self) -> Result<Subscription, ProximityError> {
        let mut attempt = 0;
        loop {
            match self.events.subscribe(event_filter()) {
                Ok(subscription) => return Ok(subscription),
                Err(e) if attempt < self.config.max_resubscribe_attempts => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Subscribe failed, retrying");
                    tokio::time::sleep(self.config.resubscribe_backoff()).await;
                }
                Err(e) => return Err(ProximityError::SubscriptionFailure(e.to_string())),
            }
        }
    }

    async fn recompute(
        &self,
        generation: u64,
        requester: &UserId,
    ) -> Result<NearbySnapshot, ProximityError> {
        let radius_m = self.preferences.preferences().visibility_radius_m;
        let query = NearbyQuery::new(requester.clone(), self.position.current_position(), radius_m);
        let result = self.query.nearby(&query).await?;

        let snapshot = NearbySnapshot {
            result,
            stale: false,
            generation,
            computed_at: self.time_source.now(),
        };
        if self.emit_snapshot(snapshot.clone()) {
            debug!(
                requester = %requester,
                count = snapshot.result.candidates.len(),
                demo_mode = snapshot.result.demo_mode,
                "Nearby list recomputed"
            );
        }
        Ok(snapshot)
    }

    async fn recompute_logged(&self, generation: u64, requester: &UserId) {
        if let Err(e) = self.recompute(generation, requester).await {
            warn!(requester = %requester, error = %e, "Recompute failed, keeping last snapshot");
        }
    }

    async fn handle_event(&self, generation: u64, requester: &UserId, event: RealtimeEvent) {
        match event {
            RealtimeEvent::SignalChanged(change) => {
                debug!(kind = ?change.kind, owner = ?change.owner_id(), "Signal change received");
                self.recompute_logged(generation, requester).await;
                if matches!(change.kind, ChangeKind::Insert | ChangeKind::Update) {
                    if let Some(signal) = change.new {
                        self.consider_arrival(generation, requester, &signal).await;
                    }
                }
            }
            RealtimeEvent::GhostModeChanged { owner_id, enabled } => {
                debug!(owner = %owner_id, enabled, "Ghost mode change received");
                self.recompute_logged(generation, requester).await;
            }
        }
    }

    async fn consider_arrival(&self, generation: u64, requester: &UserId, signal: &Signal) {
        if !self.config.arrival_notifications {
            return;
        }
        let Some(origin) = self.position.current_position() else {
            return;
        };
        let prefs = self.preferences.preferences();
        let radius_m = match prefs.radius_meters() {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Invalid visibility radius, skipping arrival check");
                return;
            }
        };
        let now = self.time_source.now();

        let (epoch, screen) = {
            let session = self.session.lock();
            if session.generation != generation || !session.arrivals_enabled {
                return;
            }
            let screen = screen_arrival(requester, &origin, radius_m, signal, &session.known, now);
            (session.arrival_epoch, screen)
        };
        let distance_m = match screen {
            ArrivalScreen::Candidate { distance_m } => distance_m,
            other => {
                debug!(owner = %signal.owner_id, screen = ?other, "Not an arrival");
                return;
            }
        };

        match self.ghost_mode.get_ghost_mode(&signal.owner_id).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(owner = %signal.owner_id, "Arrival suppressed, ghost mode");
                return;
            }
            Err(e) => {
                warn!(owner = %signal.owner_id, error = %e, "Ghost-mode check failed, treating as ghost");
                return;
            }
        }

        let notice = ArrivalNotice {
            owner_id: signal.owner_id.clone(),
            activity: signal.activity,
            signal_state: signal.signal_state,
            distance_meters: distance_m,
            haptic: prefs.vibration_enabled,
            sound: prefs.sound_enabled,
            at: now,
        };

        let _delivery = self.delivery.lock();
        {
            let mut session = self.session.lock();
            if session.generation != generation
                || !session.arrivals_enabled
                || session.arrival_epoch != epoch
            {
                return;
            }
            if !session.known.insert(notice.owner_id.clone()) {
                return;
            }
        }
        info!(owner = %notice.owner_id, distance_m = notice.distance_meters, "New arrival nearby");
        self.notifier.notify(&notice);
    }

    /// Block until no notice is being delivered on another thread.
    fn drain_delivery(&self) {
        drop(self.delivery.lock());
    }

    async fn run(self: Arc<Self>, generation: u64, requester: UserId, subscription: Subscription) {
        let mut subscription = subscription;
        let mut failures = 0u32;
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    failures = 0;
                    self.handle_event(generation, &requester, event).await;
                }
                Err(SubscriptionError::Closed) => {
                    if !self.is_current(generation) {
                        return;
                    }
                    failures += 1;
                    if failures > self.config.max_resubscribe_attempts {
                        self.mark_stale(generation);
                        return;
                    }
                    warn!(requester = %requester, failures, "Realtime subscription dropped, resubscribing");
                    tokio::time::sleep(self.config.resubscribe_backoff()).await;

                    match self.events.subscribe(event_filter()) {
                        Ok(fresh) => {
                            subscription = fresh;
                            info!(requester = %requester, id = %subscription.id(), "Resubscribed");
                            // Catch up on anything missed while disconnected.
                            self.recompute_logged(generation, &requester).await;
                        }
                        Err(e) => {
                            error!(requester = %requester, error = %e, "Resubscribe failed");
                            self.mark_stale(generation);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Per-session realtime reconciler.
pub struct RealtimeReconciler {
    core: Arc<Core>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RealtimeReconciler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ReconcilerConfig,
        events: Arc<dyn EventSubscriber>,
        query: Arc<dyn ProximityQueryApi>,
        ghost_mode: Arc<dyn GhostModeLookup>,
        notifier: Arc<dyn ArrivalNotifier>,
        position: Arc<dyn PositionProvider>,
        preferences: Arc<dyn PreferenceStore>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let (snapshot, _) = watch::channel(NearbySnapshot::idle(0, time_source.now()));
        Self {
            core: Arc::new(Core {
                config,
                events,
                query,
                ghost_mode,
                notifier,
                position,
                preferences,
                time_source,
                session: Mutex::new(SessionState::default()),
                delivery: ReentrantMutex::new(()),
                snapshot,
            }),
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.core.config
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.core.session.lock().generation
    }

    pub fn is_subscribed(&self) -> bool {
        self.core.session.lock().requester.is_some()
    }

    pub fn arrivals_enabled(&self) -> bool {
        self.core.session.lock().arrivals_enabled
    }

    /// Identities announced (or seeded) this broadcast session.
    pub fn known_users_count(&self) -> usize {
        self.core.session.lock().known.len()
    }
}

#[async_trait]
impl RealtimeReconcilerApi for RealtimeReconciler {
    async fn subscribe(&self, requester: UserId) -> Result<(), ProximityError> {
        self.unsubscribe();

        let generation = {
            let mut session = self.core.session.lock();
            session.generation += 1;
            session.requester = Some(requester.clone());
            session.generation
        };

        // Subscribe before the first recompute so no change falls in between.
        let subscription = match self.core.open_subscription().await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.core.mark_stale(generation);
                return Err(e);
            }
        };
        info!(requester = %requester, generation, id = %subscription.id(), "Realtime subscription started");

        self.core.recompute_logged(generation, &requester).await;

        let handle = tokio::spawn(Arc::clone(&self.core).run(generation, requester, subscription));
        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    fn unsubscribe(&self) {
        {
            let mut session = self.core.session.lock();
            if session.requester.is_none() && !session.arrivals_enabled {
                return;
            }
            session.generation += 1;
            session.requester = None;
            session.arrivals_enabled = false;
            session.arrival_epoch += 1;
            session.known.clear();
            self.core.snapshot.send_replace(NearbySnapshot::idle(
                session.generation,
                self.core.time_source.now(),
            ));
        }
        self.core.drain_delivery();
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        debug!("Realtime subscription torn down");
    }

    async fn refresh(&self) -> Result<NearbySnapshot, ProximityError> {
        let (generation, requester) = {
            let session = self.core.session.lock();
            (session.generation, session.requester.clone())
        };
        let Some(requester) = requester else {
            return Err(ProximityError::SubscriptionFailure(
                "no active subscription".to_string(),
            ));
        };
        self.core.recompute(generation, &requester).await
    }

    fn begin_arrivals(&self) {
        let mut session = self.core.session.lock();
        if session.arrivals_enabled {
            return;
        }
        session.arrivals_enabled = true;
        session.arrival_epoch += 1;
        session.known.clear();
        // People already listed are not new arrivals.
        let listed: Vec<UserId> = self
            .core
            .snapshot
            .borrow()
            .result
            .real_candidates()
            .map(|c| c.owner_id.clone())
            .collect();
        session.known.seed(listed);
        debug!(seeded = session.known.len(), "Arrival notices enabled");
    }

    fn end_arrivals(&self) {
        {
            let mut session = self.core.session.lock();
            session.arrivals_enabled = false;
            session.arrival_epoch += 1;
            session.known.clear();
        }
        self.core.drain_delivery();
        debug!("Arrival notices disabled");
    }

    fn snapshot(&self) -> NearbySnapshot {
        self.core.snapshot.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<NearbySnapshot> {
        self.core.snapshot.subscribe()
    }
}

impl Drop for RealtimeReconciler {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
