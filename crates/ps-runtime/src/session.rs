//! # Client Session
//!
//! Everything one signed-in user owns: identity, position and preference
//! providers, the client rate limiter, the lifecycle manager with its
//! expiry watcher, the realtime reconciler and the reveal gate.
//!
//! Per-session state (known arrivals, limiter counters) lives here and is
//! dropped with the session; nothing is global.

use crate::adapters::{MeteredQuery, StoreAdapter};
use crate::config::EngineConfig;
use parking_lot::Mutex;
use ps_02_signal_lifecycle::{
    ExpiryWatcher, LifecycleEvent, SignalLifecycleApi, SignalLifecycleManager,
};
use ps_03_proximity_query::{
    NearbyQuery, NearbyResult, ProximityQueryApi, ProximityQueryService, SeededDemoGenerator,
};
use ps_04_realtime_reconciler::{
    ArrivalNotifier, NearbySnapshot, RealtimeReconciler, RealtimeReconcilerApi,
};
use ps_05_reveal_gate::{RevealApi, RevealGate};
use ps_telemetry::{
    metric_inc, ACTIVE_SESSIONS, REVEALS, SIGNAL_ACTIVATIONS, SIGNAL_CREATION_DENIALS,
    SIGNAL_ENDINGS, SUBSCRIPTION_FAILURES,
};
use shared_bus::InMemoryEventBus;
use shared_types::{
    Activity, ClientRateLimiter, Coordinates, ExtendedProfile, Identity, InMemoryPreferences,
    LatestPosition, LimiterStatus, LocalPreferences, PositionProvider, PreferenceStore,
    ProximityError, RateLimitAction, SessionIdentity, Signal, SignalState, TimeSource, UserId,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};


/// One user's wired subsystems.
pub struct ClientSession {
    user_id: UserId,
    identity: Arc<SessionIdentity>,
    position: Arc<LatestPosition>,
    preferences: Arc<InMemoryPreferences>,
    limiter: Arc<ClientRateLimiter>,
    lifecycle: Arc<SignalLifecycleManager>,
    query: Arc<dyn ProximityQueryApi>,
    reconciler: Arc<RealtimeReconciler>,
    reveal: RevealGate,
    store: StoreAdapter,
    time_source: Arc<dyn TimeSource>,
    watcher: Mutex<Option<ExpiryWatcher>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    open: AtomicBool,
}

impl ClientSession {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: &EngineConfig,
        identity: Identity,
        position: Option<Coordinates>,
        preferences: LocalPreferences,
        store: StoreAdapter,
        bus: Arc<InMemoryEventBus>,
        notifier: Arc<dyn ArrivalNotifier>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let user_id = identity.user_id.clone();
        let identity = Arc::new(SessionIdentity::signed_in(identity));
        let position = Arc::new(position.map(LatestPosition::at).unwrap_or_default());
        let preferences = Arc::new(InMemoryPreferences::new(preferences));
        let limiter = Arc::new(ClientRateLimiter::new());
        let gateway = Arc::new(store.clone());

        let lifecycle = Arc::new(SignalLifecycleManager::new(
            config.lifecycle.clone(),
            identity.clone(),
            position.clone(),
            gateway.clone(),
            limiter.clone(),
            time_source.clone(),
        ));

        let service = ProximityQueryService::new(
            config.query.clone(),
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
            Arc::new(SeededDemoGenerator),
            time_source.clone(),
        );
        let query: Arc<dyn ProximityQueryApi> = Arc::new(MeteredQuery::new(Arc::new(service)));

        let reconciler = Arc::new(RealtimeReconciler::new(
            config.reconciler.clone(),
            bus,
            query.clone(),
            gateway.clone(),
            notifier,
            position.clone(),
            preferences.clone(),
            time_source.clone(),
        ));

        let reveal = RevealGate::new(config.reveal.clone(), gateway.clone(), gateway);

        Self {
            user_id,
            identity,
            position,
            preferences,
            limiter,
            lifecycle,
            query,
            reconciler,
            reveal,
            store,
            time_source,
            watcher: Mutex::new(None),
            listener: Mutex::new(None),
            open: AtomicBool::new(false),
        }
    }

    /// Subscribe to realtime changes and start the background tasks.
    pub(crate) async fn start(&self) -> Result<(), ProximityError> {
        self.reconciler.subscribe(self.user_id.clone()).await?;

        *self.watcher.lock() = Some(ExpiryWatcher::spawn(self.lifecycle.clone()));
        let handle = tokio::spawn(watch_session(
            self.lifecycle.subscribe_events(),
            self.reconciler.watch(),
            self.reconciler.clone(),
        ));
        if let Some(previous) = self.listener.lock().replace(handle) {
            previous.abort();
        }

        if !self.open.swap(true, Ordering::SeqCst) {
            ACTIVE_SESSIONS.inc();
        }
        info!(user = %self.user_id, "Client session started");
        Ok(())
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn lifecycle(&self) -> &Arc<SignalLifecycleManager> {
        &self.lifecycle
    }

    pub fn reconciler(&self) -> &Arc<RealtimeReconciler> {
        &self.reconciler
    }

    pub fn preferences(&self) -> LocalPreferences {
        self.preferences.preferences()
    }

    pub fn position(&self) -> Option<Coordinates> {
        self.position.current_position()
    }

    /// Client-side creation budget as of now.
    pub fn creation_status(&self) -> LimiterStatus {
        self.limiter
            .status(RateLimitAction::SignalCreation, self.time_source.now())
    }

    // -------------------------------------------------------------------------
    // Broadcasting
    // -------------------------------------------------------------------------

    /// Start broadcasting, or update the live signal in place.
    ///
    /// On success arrival notices are enabled, seeded with whoever is
    /// already listed.
    pub async fn activate(
        &self,
        activity: Activity,
        signal_state: SignalState,
        location_description: Option<String>,
    ) -> Result<Signal, ProximityError> {
        let was_active = self.lifecycle.current().await.is_some();
        let client_blocked = matches!(self.creation_status(), LimiterStatus::Blocked { .. });

        match self
            .lifecycle
            .activate(activity, signal_state, location_description)
            .await
        {
            Ok(signal) => {
                let outcome = if was_active { "updated" } else { "created" };
                metric_inc!(SIGNAL_ACTIVATIONS, &[outcome]);
                self.reconciler.begin_arrivals();
                Ok(signal)
            }
            Err(e @ ProximityError::RateLimitExceeded { .. }) => {
                let source = if client_blocked { "client" } else { "server" };
                metric_inc!(SIGNAL_ACTIVATIONS, &["denied"]);
                metric_inc!(SIGNAL_CREATION_DENIALS, &[source]);
                warn!(user = %self.user_id, source, retry_after = ?e.retry_after(), "Signal creation denied");
                Err(e)
            }
            Err(e) => {
                metric_inc!(SIGNAL_ACTIVATIONS, &["failed"]);
                Err(e)
            }
        }
    }

    /// New position fix: move the live signal (if any) and recompute.
    pub async fn move_to(&self, fix: Coordinates) -> Result<NearbySnapshot, ProximityError> {
        self.position.update(fix);
        self.lifecycle.update_position().await?;
        self.reconciler.refresh().await
    }

    pub async fn cycle_state(&self) -> Result<Option<Signal>, ProximityError> {
        self.lifecycle.cycle_state().await
    }

    pub async fn extend(&self) -> Result<Signal, ProximityError> {
        self.lifecycle.extend().await
    }

    /// Stop broadcasting. Arrival notices stop before the delete is sent.
    pub async fn deactivate(&self) -> Result<(), ProximityError> {
        let was_active = self.lifecycle.current().await.is_some();
        // A failed delete keeps the signal live, so arrivals stay on with it.
        self.lifecycle.deactivate().await?;
        self.reconciler.end_arrivals();
        if was_active {
            metric_inc!(SIGNAL_ENDINGS, &["deactivated"]);
        }
        Ok(())
    }

    pub async fn current_signal(&self) -> Option<Signal> {
        self.lifecycle.current().await
    }

    pub async fn time_to_expiry(&self) -> Option<Duration> {
        self.lifecycle.time_to_expiry().await
    }

    // -------------------------------------------------------------------------
    // Privacy
    // -------------------------------------------------------------------------

    /// Toggle ghost mode server-side, then mirror it locally.
    pub async fn set_ghost_mode(&self, enabled: bool) -> Result<(), ProximityError> {
        self.store.store().set_ghost_mode(&self.user_id, enabled).await?;
        let mut prefs = self.preferences.preferences();
        prefs.ghost_mode = enabled;
        self.preferences.replace(prefs);
        Ok(())
    }

    /// Change the discovery radius and recompute.
    pub async fn set_radius(&self, radius_m: u32) -> Result<NearbySnapshot, ProximityError> {
        shared_types::validate_radius(radius_m)?;
        let mut prefs = self.preferences.preferences();
        prefs.visibility_radius_m = radius_m;
        self.preferences.replace(prefs);
        self.reconciler.refresh().await
    }

    // -------------------------------------------------------------------------
    // Discovery
    // -------------------------------------------------------------------------

    /// One-shot nearby query at the current position and preferred radius.
    pub async fn nearby(&self) -> Result<NearbyResult, ProximityError> {
        let query = NearbyQuery::new(
            self.user_id.clone(),
            self.position.current_position(),
            self.preferences.preferences().visibility_radius_m,
        );
        self.query.nearby(&query).await
    }

    /// Latest reconciled snapshot.
    pub fn snapshot(&self) -> NearbySnapshot {
        self.reconciler.snapshot()
    }

    pub fn watch(&self) -> watch::Receiver<NearbySnapshot> {
        self.reconciler.watch()
    }

    /// Check-and-log a reveal, then fetch the extended profile.
    pub async fn reveal(&self, target: &UserId) -> Result<ExtendedProfile, ProximityError> {
        let result = self.reveal.reveal(&self.user_id, target).await;
        let outcome = match &result {
            Ok(_) => "allowed",
            Err(ProximityError::RateLimitExceeded { .. }) => "denied",
            Err(ProximityError::PrivacyDenied(_)) => "hidden",
            Err(_) => "failed",
        };
        metric_inc!(REVEALS, &[outcome]);
        result
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Stop delivery and background tasks. The live signal is left to
    /// expire server-side; call `deactivate` first to remove it now.
    pub fn close(&self) {
        self.reconciler.unsubscribe();
        self.reconciler.end_arrivals();
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }
        if let Some(watcher) = self.watcher.lock().take() {
            watcher.stop();
        }
        if self.open.swap(false, Ordering::SeqCst) {
            ACTIVE_SESSIONS.dec();
            self.identity.sign_out();
            info!(user = %self.user_id, "Client session closed");
        }
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Follows lifecycle events and snapshot staleness for one session.
async fn watch_session(
    mut lifecycle_events: broadcast::Receiver<LifecycleEvent>,
    mut snapshots: watch::Receiver<NearbySnapshot>,
    reconciler: Arc<RealtimeReconciler>,
) {
    let mut was_stale = snapshots.borrow().stale;
    loop {
        tokio::select! {
            event = lifecycle_events.recv() => match event {
                Ok(LifecycleEvent::Expired { owner_id, expired_at }) => {
                    reconciler.end_arrivals();
                    metric_inc!(SIGNAL_ENDINGS, &["expired"]);
                    info!(owner = %owner_id, expired_at = %expired_at, "Broadcast ended by expiry");
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Lifecycle listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let stale = snapshots.borrow_and_update().stale;
                if stale && !was_stale {
                    metric_inc!(SUBSCRIPTION_FAILURES);
                }
                was_stale = stale;
            }
        }
    }
}
