//! Inbound port: what the UI calls.

use crate::domain::LifecycleEvent;
use async_trait::async_trait;
use shared_types::{Activity, ProximityError, Signal, SignalState};
use tokio::sync::broadcast;

/// Signal lifecycle API.
#[async_trait]
pub trait SignalLifecycleApi: Send + Sync {
    /// Start broadcasting, or update the live signal in place.
    async fn activate(
        &self,
        activity: Activity,
        state: SignalState,
        location_description: Option<String>,
    ) -> Result<Signal, ProximityError>;

    /// Move the live signal to the current position. `Ok(None)` if inactive.
    async fn update_position(&self) -> Result<Option<Signal>, ProximityError>;

    /// Advance green → yellow → red → green. `Ok(None)` if inactive.
    async fn cycle_state(&self) -> Result<Option<Signal>, ProximityError>;

    /// Reset expiry to now + TTL. Fails with `ValidationError` if inactive.
    async fn extend(&self) -> Result<Signal, ProximityError>;

    /// Stop broadcasting. No-op if inactive.
    async fn deactivate(&self) -> Result<(), ProximityError>;

    /// The live signal, if any.
    async fn current(&self) -> Option<Signal>;

    /// Listen for lifecycle transitions.
    fn subscribe_events(&self) -> broadcast::Receiver<LifecycleEvent>;
}
