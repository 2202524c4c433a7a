//! # Signal Lifecycle Manager
//!
//! Owns the local user's broadcast signal.
//!
//! Every mutation runs under one async lock and commits local state only
//! after the gateway write succeeds, so a failed write leaves the manager
//! exactly as it was.

use crate::config::LifecycleConfig;
use crate::domain::{normalize_description, LifecycleEvent, LifecycleState};
use crate::ports::{SignalGateway, SignalLifecycleApi};
use async_trait::async_trait;
use shared_types::{
    Activity, ClientRateLimiter, Coordinates, Identity, IdentityProvider, LimiterStatus,
    PositionProvider, ProximityError, RateLimitAction, Signal, SignalState, TimeSource, Timestamp,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Signal lifecycle manager.
pub struct SignalLifecycleManager {
    config: LifecycleConfig,
    identity: Arc<dyn IdentityProvider>,
    position: Arc<dyn PositionProvider>,
    gateway: Arc<dyn SignalGateway>,
    limiter: Arc<ClientRateLimiter>,
    time_source: Arc<dyn TimeSource>,
    state: Mutex<LifecycleState>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl SignalLifecycleManager {
    /// Create a manager in the `Inactive` state.
    pub fn new(
        config: LifecycleConfig,
        identity: Arc<dyn IdentityProvider>,
        position: Arc<dyn PositionProvider>,
        gateway: Arc<dyn SignalGateway>,
        limiter: Arc<ClientRateLimiter>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            config,
            identity,
            position,
            gateway,
            limiter,
            time_source,
            state: Mutex::new(LifecycleState::Inactive),
            events,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Time left on the live signal, `Some(ZERO)` once it is due.
    pub async fn time_to_expiry(&self) -> Option<Duration> {
        let now = self.time_source.now();
        self.state
            .lock()
            .await
            .signal()
            .map(|s| now.duration_until(s.expires_at))
    }

    /// Move to `Inactive` if the live signal has expired.
    ///
    /// Emits `Expired` and makes a best-effort server delete. Returns
    /// whether a transition happened.
    pub async fn check_expiry(&self) -> bool {
        let mut state = self.state.lock().await;
        let now = self.time_source.now();
        let Some(expired) = state.signal().filter(|s| s.is_expired(now)).cloned() else {
            return false;
        };

        *state = LifecycleState::Inactive;
        info!(owner = %expired.owner_id, expires_at = %expired.expires_at, "Signal expired");
        self.emit(LifecycleEvent::Expired {
            owner_id: expired.owner_id.clone(),
            expired_at: expired.expires_at,
        });

        // Queries already ignore the row; removing it just keeps the table small.
        if let Err(e) = self.gateway.delete_signal(&expired.owner_id).await {
            warn!(owner = %expired.owner_id, error = %e, "Best-effort delete of expired signal failed");
        }
        true
    }

    fn require_identity(&self) -> Result<Identity, ProximityError> {
        self.identity
            .current_identity()
            .ok_or(ProximityError::NotAuthenticated)
    }

    fn require_position(&self) -> Result<Coordinates, ProximityError> {
        let fix = self
            .position
            .current_position()
            .ok_or(ProximityError::NoPosition)?;
        if !fix.is_valid() {
            return Err(ProximityError::ValidationError(format!(
                "position ({}, {}) out of range",
                fix.latitude, fix.longitude
            )));
        }
        Ok(fix)
    }

    fn emit(&self, event: LifecycleEvent) {
        // No listeners is fine.
        let _ = self.events.send(event);
    }

    /// Expire a stale local signal before a mutation looks at it.
    fn drop_if_expired(&self, state: &mut LifecycleState, now: Timestamp) {
        if let Some(signal) = state.signal().filter(|s| s.is_expired(now)) {
            debug!(owner = %signal.owner_id, "Local signal expired before mutation");
            self.emit(LifecycleEvent::Expired {
                owner_id: signal.owner_id.clone(),
                expired_at: signal.expires_at,
            });
            *state = LifecycleState::Inactive;
        }
    }

    async fn ensure_creation_allowed(&self, identity: &Identity, now: Timestamp) -> Result<(), ProximityError> {
        let action = RateLimitAction::SignalCreation;
        if let LimiterStatus::Blocked { retry_after } = self.limiter.status(action, now) {
            info!(owner = %identity.user_id, retry_ms = retry_after.as_millis() as u64, "Signal creation blocked by client limiter");
            return Err(ProximityError::rate_limited(action.as_str(), Some(retry_after)));
        }

        if !self
            .gateway
            .check_signal_creation_rate_limit(&identity.user_id)
            .await?
        {
            let retry_after = self.gateway.creation_retry_after(&identity.user_id).await;
            info!(owner = %identity.user_id, "Signal creation denied by server");
            return Err(ProximityError::rate_limited(action.as_str(), retry_after));
        }
        Ok(())
    }
}

#[async_trait]
impl SignalLifecycleApi for SignalLifecycleManager {
    async fn activate(
        &self,
        activity: Activity,
        signal_state: SignalState,
        location_description: Option<String>,
    ) -> Result<Signal, ProximityError> {
        let identity = self.require_identity()?;
        let coordinates = self.require_position()?;
        let description =
            normalize_description(location_description.as_deref(), self.config.max_description_len)?;

        let mut state = self.state.lock().await;
        let now = self.time_source.now();
        self.drop_if_expired(&mut state, now);

        let existing = state
            .signal()
            .filter(|s| s.owner_id == identity.user_id)
            .cloned();

        let (signal, event) = match existing {
            Some(current) => {
                let updated = Signal {
                    activity,
                    signal_state,
                    coordinates,
                    location_description: description,
                    ..current
                };
                self.gateway.upsert_signal(&updated).await?;
                debug!(owner = %identity.user_id, "Active signal updated in place");
                (updated.clone(), LifecycleEvent::Updated(updated))
            }
            None => {
                self.ensure_creation_allowed(&identity, now).await?;
                let created = Signal::new(
                    identity.user_id.clone(),
                    activity,
                    signal_state,
                    coordinates,
                    description,
                    now,
                    self.config.signal_ttl(),
                );
                self.gateway.upsert_signal(&created).await?;
                // Only a stored creation spends the client budget.
                self.limiter.record(RateLimitAction::SignalCreation, now);
                info!(
                    owner = %identity.user_id,
                    activity = %activity,
                    state = ?signal_state,
                    expires_at = %created.expires_at,
                    "Signal activated"
                );
                (created.clone(), LifecycleEvent::Activated(created))
            }
        };

        *state = LifecycleState::Active(signal.clone());
        self.emit(event);
        Ok(signal)
    }

    async fn update_position(&self) -> Result<Option<Signal>, ProximityError> {
        let mut state = self.state.lock().await;
        self.drop_if_expired(&mut state, self.time_source.now());
        let Some(current) = state.signal().cloned() else {
            return Ok(None);
        };

        let moved = current.moved_to(self.require_position()?);
        self.gateway.upsert_signal(&moved).await?;
        debug!(owner = %moved.owner_id, lat = moved.coordinates.latitude, lon = moved.coordinates.longitude, "Signal position updated");

        *state = LifecycleState::Active(moved.clone());
        self.emit(LifecycleEvent::Updated(moved.clone()));
        Ok(Some(moved))
    }

    async fn cycle_state(&self) -> Result<Option<Signal>, ProximityError> {
        let mut state = self.state.lock().await;
        self.drop_if_expired(&mut state, self.time_source.now());
        let Some(current) = state.signal().cloned() else {
            return Ok(None);
        };

        let cycled = current.cycled();
        self.gateway.upsert_signal(&cycled).await?;
        debug!(owner = %cycled.owner_id, from = ?current.signal_state, to = ?cycled.signal_state, "Signal state cycled");

        *state = LifecycleState::Active(cycled.clone());
        self.emit(LifecycleEvent::Updated(cycled.clone()));
        Ok(Some(cycled))
    }

    async fn extend(&self) -> Result<Signal, ProximityError> {
        let mut state = self.state.lock().await;
        let now = self.time_source.now();
        self.drop_if_expired(&mut state, now);
        let Some(current) = state.signal().cloned() else {
            return Err(ProximityError::ValidationError(
                "no active signal to extend".into(),
            ));
        };

        let extended = current.extended(now, self.config.signal_ttl());
        self.gateway.upsert_signal(&extended).await?;
        info!(owner = %extended.owner_id, expires_at = %extended.expires_at, "Signal extended");

        *state = LifecycleState::Active(extended.clone());
        self.emit(LifecycleEvent::Extended(extended.clone()));
        Ok(extended)
    }

    async fn deactivate(&self) -> Result<(), ProximityError> {
        let mut state = self.state.lock().await;
        let Some(current) = state.signal().cloned() else {
            return Ok(());
        };

        self.gateway.delete_signal(&current.owner_id).await?;
        info!(owner = %current.owner_id, "Signal deactivated");

        *state = LifecycleState::Inactive;
        self.emit(LifecycleEvent::Deactivated {
            owner_id: current.owner_id,
        });
        Ok(())
    }

    async fn current(&self) -> Option<Signal> {
        let now = self.time_source.now();
        self.state.lock().await.live_signal(now).cloned()
    }

    fn subscribe_events(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }
}
