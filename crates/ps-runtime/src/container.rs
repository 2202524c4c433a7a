//! # Engine Container
//!
//! Holds the process-wide pieces (event bus, store, clock) and opens one
//! [`ClientSession`] per signed-in user.
//!
//! ```text
//! EngineContainer
//!   ├── InMemoryEventBus ◄── publishes ── InMemorySignalStore
//!   ├── StoreAdapter (all store-facing ports)
//!   ├── purge task (interval, optional)
//!   └── open_session() ──> ClientSession (lifecycle, query, reconciler, reveal)
//! ```

use crate::adapters::{StoreAdapter, TracingNotifier};
use crate::config::{ConfigError, EngineConfig};
use crate::session::ClientSession;
use parking_lot::Mutex;
use ps_01_signal_store::InMemorySignalStore;
use ps_04_realtime_reconciler::ArrivalNotifier;
use shared_bus::InMemoryEventBus;
use shared_types::{
    Coordinates, ExtendedProfile, Identity, LocalPreferences, ProximityError, SystemTimeSource,
    TimeSource,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Process-wide wiring.
pub struct EngineContainer {
    config: EngineConfig,
    bus: Arc<InMemoryEventBus>,
    store: Arc<InMemorySignalStore>,
    adapter: StoreAdapter,
    time_source: Arc<dyn TimeSource>,
    purge_task: Mutex<Option<JoinHandle<()>>>,
}

impl EngineContainer {
    /// Build a container on the system clock.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    /// Build a container on an explicit clock.
    pub fn with_time_source(
        config: EngineConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus.channel_capacity));
        let store = Arc::new(InMemorySignalStore::new(
            config.store.clone(),
            bus.clone(),
            time_source.clone(),
        ));
        let adapter = StoreAdapter::new(store.clone());

        info!(
            creation_limit = config.store.creation_limit,
            default_radius_m = config.query.default_radius_m,
            demo_enabled = config.query.demo_enabled,
            "Engine container initialized"
        );

        Ok(Self {
            config,
            bus,
            store,
            adapter,
            time_source,
            purge_task: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<InMemorySignalStore> {
        &self.store
    }

    pub fn time_source(&self) -> &Arc<dyn TimeSource> {
        &self.time_source
    }

    /// Create or replace a user's profile row.
    pub fn register_profile(&self, profile: ExtendedProfile) {
        debug!(user = %profile.user_id, "Profile registered");
        self.store.put_profile(profile);
    }

    /// Open and start a session for `identity`.
    ///
    /// Returns once the realtime subscription is live and the first
    /// nearby snapshot has been computed.
    pub async fn open_session(
        &self,
        identity: Identity,
        position: Option<Coordinates>,
        preferences: LocalPreferences,
    ) -> Result<ClientSession, ProximityError> {
        self.open_session_with_notifier(identity, position, preferences, Arc::new(TracingNotifier))
            .await
    }

    /// Like [`open_session`](Self::open_session) with a custom arrival sink.
    pub async fn open_session_with_notifier(
        &self,
        identity: Identity,
        position: Option<Coordinates>,
        preferences: LocalPreferences,
        notifier: Arc<dyn ArrivalNotifier>,
    ) -> Result<ClientSession, ProximityError> {
        let session = ClientSession::new(
            &self.config,
            identity,
            position,
            preferences,
            self.adapter.clone(),
            self.bus.clone(),
            notifier,
            self.time_source.clone(),
        );
        session.start().await?;
        Ok(session)
    }

    /// Start the periodic server-side purge of expired rows.
    ///
    /// No-op when the interval is zero or the task is already running.
    pub fn start_purge_task(&self) {
        let Some(interval) = self.config.runtime.purge_interval() else {
            debug!("Expired-signal purge disabled");
            return;
        };
        let mut slot = self.purge_task.lock();
        if slot.is_some() {
            return;
        }
        let store = self.store.clone();
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.purge_expired().await;
            }
        }));
        info!(interval_secs = interval.as_secs(), "Expired-signal purge started");
    }

    pub fn is_purging(&self) -> bool {
        self.purge_task.lock().is_some()
    }

    /// Stop background work and close the bus.
    pub fn shutdown(&self) {
        if let Some(handle) = self.purge_task.lock().take() {
            handle.abort();
        }
        self.bus.close();
        info!("Engine container shut down");
    }
}

impl Drop for EngineContainer {
    fn drop(&mut self) {
        if let Some(handle) = self.purge_task.lock().take() {
            handle.abort();
        }
    }
}
