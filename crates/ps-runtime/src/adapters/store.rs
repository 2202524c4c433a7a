//! Store adapter: one handle onto the in-memory store, implementing every
//! port that reads or writes it.

use async_trait::async_trait;
use ps_01_signal_store::InMemorySignalStore;
use ps_02_signal_lifecycle::SignalGateway;
use ps_03_proximity_query::{GhostModeLookup, ProfileDirectory, SignalQueryGateway};
use ps_05_reveal_gate::{ExtendedProfileSource, RevealLedger};
use shared_types::{
    ExtendedProfile, NearbySignalRow, ProximityError, PublicProfile, Signal, Timestamp, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Runtime implementation of the store-facing ports.
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<InMemorySignalStore>,
}

impl StoreAdapter {
    pub fn new(store: Arc<InMemorySignalStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<InMemorySignalStore> {
        &self.store
    }
}

#[async_trait]
impl SignalGateway for StoreAdapter {
    async fn upsert_signal(&self, signal: &Signal) -> Result<(), ProximityError> {
        Ok(self.store.upsert_signal(signal.clone()).await?)
    }

    async fn delete_signal(&self, owner: &UserId) -> Result<(), ProximityError> {
        let removed = self.store.delete_signal(owner).await?;
        debug!(owner = %owner, removed, "Signal delete forwarded to store");
        Ok(())
    }

    async fn check_signal_creation_rate_limit(&self, owner: &UserId) -> Result<bool, ProximityError> {
        Ok(self.store.check_signal_creation_rate_limit(owner).await?)
    }

    async fn creation_retry_after(&self, owner: &UserId) -> Option<Duration> {
        self.store.creation_retry_after(owner)
    }
}

#[async_trait]
impl SignalQueryGateway for StoreAdapter {
    async fn query_nearby_signals(
        &self,
        requester: &UserId,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Vec<NearbySignalRow>, ProximityError> {
        Ok(self
            .store
            .query_nearby_signals(requester, latitude, longitude, radius_m)
            .await?)
    }

    async fn query_raw_signals(
        &self,
        exclude_owner: &UserId,
        not_expired_before: Timestamp,
    ) -> Result<Vec<Signal>, ProximityError> {
        Ok(self
            .store
            .query_raw_signals(exclude_owner, not_expired_before)
            .await?)
    }
}

#[async_trait]
impl ProfileDirectory for StoreAdapter {
    async fn resolve_public_profiles(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<PublicProfile>, ProximityError> {
        Ok(self.store.resolve_public_profiles(ids).await?)
    }
}

#[async_trait]
impl GhostModeLookup for StoreAdapter {
    async fn get_ghost_mode(&self, owner: &UserId) -> Result<bool, ProximityError> {
        Ok(self.store.get_ghost_mode(owner).await?)
    }
}

#[async_trait]
impl RevealLedger for StoreAdapter {
    async fn check_and_log_reveal(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<bool, ProximityError> {
        Ok(self.store.check_and_log_reveal(viewer, target).await?)
    }

    async fn reveal_retry_after(&self, viewer: &UserId, target: &UserId) -> Option<Duration> {
        self.store.reveal_retry_after(viewer, target)
    }
}

#[async_trait]
impl ExtendedProfileSource for StoreAdapter {
    async fn fetch_extended_profile(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<Option<ExtendedProfile>, ProximityError> {
        Ok(self.store.fetch_extended_profile(viewer, target).await?)
    }
}
