//! Outbound ports.

use async_trait::async_trait;
use shared_types::{
    Coordinates, NearbyCandidate, NearbySignalRow, ProximityError, PublicProfile, Signal,
    Timestamp, UserId,
};

/// Signal read path of the persistence backend.
#[async_trait]
pub trait SignalQueryGateway: Send + Sync {
    /// Privacy-filtered aggregate query (tier 1).
    async fn query_nearby_signals(
        &self,
        requester: &UserId,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Vec<NearbySignalRow>, ProximityError>;

    /// Raw signal rows (tier 2). Not privacy-filtered.
    async fn query_raw_signals(
        &self,
        exclude_owner: &UserId,
        not_expired_before: Timestamp,
    ) -> Result<Vec<Signal>, ProximityError>;
}

/// Privileged batch profile lookup.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn resolve_public_profiles(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<PublicProfile>, ProximityError>;
}

/// Per-identity ghost-mode check.
#[async_trait]
pub trait GhostModeLookup: Send + Sync {
    async fn get_ghost_mode(&self, owner: &UserId) -> Result<bool, ProximityError>;
}

/// Synthetic candidate source (tier 3). Must be pure.
pub trait DemoGenerator: Send + Sync {
    fn generate(
        &self,
        anchor: &Coordinates,
        count: usize,
        within_m: f64,
        now: Timestamp,
    ) -> Vec<NearbyCandidate>;
}
