//! Inbound port.

use crate::domain::NearbySnapshot;
use async_trait::async_trait;
use shared_types::{ProximityError, UserId};
use tokio::sync::watch;

/// Realtime reconciliation API, one instance per client session.
#[async_trait]
pub trait RealtimeReconcilerApi: Send + Sync {
    /// Start (or restart) the change-event subscription for `requester`.
    ///
    /// Any previous subscription is torn down first. Returns once the
    /// initial snapshot has been computed.
    async fn subscribe(&self, requester: UserId) -> Result<(), ProximityError>;

    /// Stop delivery. No snapshot or notice is emitted after this returns.
    fn unsubscribe(&self);

    /// Recompute now, e.g. after the requester moved.
    async fn refresh(&self) -> Result<NearbySnapshot, ProximityError>;

    /// The requester started broadcasting: enable arrival notices.
    fn begin_arrivals(&self);

    /// The requester stopped broadcasting: disable notices and forget
    /// announced identities.
    fn end_arrivals(&self);

    /// Latest snapshot.
    fn snapshot(&self) -> NearbySnapshot;

    /// Watch channel carrying every new snapshot.
    fn watch(&self) -> watch::Receiver<NearbySnapshot>;
}
