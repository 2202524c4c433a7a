//! Metrics decorator around the proximity query service.

use async_trait::async_trait;
use ps_03_proximity_query::{NearbyQuery, NearbyResult, ProximityQueryApi};
use ps_telemetry::{metric_inc, time_histogram, NEARBY_QUERIES, NEARBY_QUERY_DURATION};
use shared_types::ProximityError;
use std::sync::Arc;

/// Counts queries by serving tier and times each one.
pub struct MeteredQuery {
    inner: Arc<dyn ProximityQueryApi>,
}

impl MeteredQuery {
    pub fn new(inner: Arc<dyn ProximityQueryApi>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ProximityQueryApi for MeteredQuery {
    async fn nearby(&self, query: &NearbyQuery) -> Result<NearbyResult, ProximityError> {
        let _timer = time_histogram!(NEARBY_QUERY_DURATION);
        let result = self.inner.nearby(query).await;
        match &result {
            Ok(result) => metric_inc!(NEARBY_QUERIES, &[result.tier.as_str()]),
            Err(_) => metric_inc!(NEARBY_QUERIES, &["rejected"]),
        }
        result
    }
}
