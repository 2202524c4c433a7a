//! Inbound port.

use crate::domain::{NearbyQuery, NearbyResult};
use async_trait::async_trait;
use shared_types::ProximityError;

/// Nearby discovery API.
#[async_trait]
pub trait ProximityQueryApi: Send + Sync {
    /// Run the discovery cascade.
    ///
    /// Only prerequisite errors surface; backend failures fall through to
    /// the next tier.
    async fn nearby(&self, query: &NearbyQuery) -> Result<NearbyResult, ProximityError>;
}
