//! # Proximity Query Service
//!
//! Runs the discovery cascade. Each tier is attempted only when the one
//! before it produced no qualifying candidate:
//!
//! 1. Aggregate query (privacy-filtered server-side), exact distance here.
//! 2. Raw signal query, ghost mode re-checked per row, names resolved in
//!    one batch.
//! 3. Demo population, flagged `demo_mode`.

use crate::algorithms::{candidate_from_signal, rank_rows, retain_within_and_sort};
use crate::config::QueryConfig;
use crate::domain::{NearbyQuery, NearbyResult, QueryTier};
use crate::ports::{
    DemoGenerator, GhostModeLookup, ProfileDirectory, ProximityQueryApi, SignalQueryGateway,
};
use async_trait::async_trait;
use shared_types::{
    haversine_distance, validate_radius, Coordinates, NearbyCandidate, ProximityError,
    RatingSnapshot, TimeSource, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Proximity query service.
pub struct ProximityQueryService {
    config: QueryConfig,
    signals: Arc<dyn SignalQueryGateway>,
    profiles: Arc<dyn ProfileDirectory>,
    ghost_mode: Arc<dyn GhostModeLookup>,
    demo: Arc<dyn DemoGenerator>,
    time_source: Arc<dyn TimeSource>,
}

impl ProximityQueryService {
    pub fn new(
        config: QueryConfig,
        signals: Arc<dyn SignalQueryGateway>,
        profiles: Arc<dyn ProfileDirectory>,
        ghost_mode: Arc<dyn GhostModeLookup>,
        demo: Arc<dyn DemoGenerator>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            signals,
            profiles,
            ghost_mode,
            demo,
            time_source,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Query with the configured default radius.
    pub async fn nearby_default(
        &self,
        requester: UserId,
        position: Option<Coordinates>,
    ) -> Result<NearbyResult, ProximityError> {
        let query = NearbyQuery::new(requester, position, self.config.default_radius_m);
        self.nearby(&query).await
    }

    async fn aggregate_tier(
        &self,
        query: &NearbyQuery,
        origin: &Coordinates,
        radius_m: f64,
    ) -> Vec<NearbyCandidate> {
        match self
            .signals
            .query_nearby_signals(&query.requester, origin.latitude, origin.longitude, radius_m)
            .await
        {
            Ok(rows) => rank_rows(origin, rows, radius_m),
            Err(e) => {
                warn!(requester = %query.requester, error = %e, "Aggregate nearby query failed, falling back");
                Vec::new()
            }
        }
    }

    async fn raw_fallback_tier(
        &self,
        query: &NearbyQuery,
        origin: &Coordinates,
        radius_m: f64,
    ) -> Vec<NearbyCandidate> {
        let now = self.time_source.now();
        let signals = match self.signals.query_raw_signals(&query.requester, now).await {
            Ok(signals) => signals,
            Err(e) => {
                warn!(requester = %query.requester, error = %e, "Raw signal query failed");
                return Vec::new();
            }
        };

        // Distance first so far-away rows never cost a ghost lookup.
        let in_range: Vec<_> = signals
            .into_iter()
            .filter(|s| s.owner_id != query.requester && !s.is_expired(now))
            .filter(|s| haversine_distance(origin, &s.coordinates) <= radius_m)
            .collect();

        let mut visible = Vec::with_capacity(in_range.len());
        for signal in in_range {
            if self.config.recheck_ghost_mode_in_fallback {
                match self.ghost_mode.get_ghost_mode(&signal.owner_id).await {
                    Ok(false) => {}
                    Ok(true) => continue,
                    Err(e) => {
                        // Unknown privacy state counts as hidden.
                        warn!(owner = %signal.owner_id, error = %e, "Ghost-mode check failed, hiding row");
                        continue;
                    }
                }
            }
            visible.push(signal);
        }
        if visible.is_empty() {
            return Vec::new();
        }

        let ids: Vec<UserId> = visible.iter().map(|s| s.owner_id.clone()).collect();
        let profiles: HashMap<UserId, (String, RatingSnapshot)> =
            match self.profiles.resolve_public_profiles(&ids).await {
                Ok(profiles) => profiles
                    .into_iter()
                    .map(|p| (p.user_id, (p.display_name, p.rating)))
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "Profile lookup failed, using fallback names");
                    HashMap::new()
                }
            };

        let candidates = visible
            .into_iter()
            .map(|signal| {
                let (name, rating) = profiles.get(&signal.owner_id).cloned().unwrap_or_else(|| {
                    (self.config.fallback_display_name.clone(), RatingSnapshot::default())
                });
                candidate_from_signal(origin, signal, name, rating)
            })
            .collect();
        retain_within_and_sort(candidates, radius_m)
    }
}

#[async_trait]
impl ProximityQueryApi for ProximityQueryService {
    async fn nearby(&self, query: &NearbyQuery) -> Result<NearbyResult, ProximityError> {
        let radius_m = validate_radius(query.radius_m)?;
        let Some(origin) = query.position else {
            debug!(requester = %query.requester, "No position, skipping nearby query");
            return Ok(NearbyResult::empty(QueryTier::Skipped));
        };
        if !origin.is_valid() {
            return Err(ProximityError::ValidationError(format!(
                "position ({}, {}) out of range",
                origin.latitude, origin.longitude
            )));
        }

        let aggregate = self.aggregate_tier(query, &origin, radius_m).await;
        if !aggregate.is_empty() {
            debug!(requester = %query.requester, count = aggregate.len(), "Nearby via aggregate tier");
            return Ok(NearbyResult::real(aggregate, QueryTier::Aggregate));
        }

        let raw = self.raw_fallback_tier(query, &origin, radius_m).await;
        if !raw.is_empty() {
            info!(requester = %query.requester, count = raw.len(), "Nearby via raw fallback tier");
            return Ok(NearbyResult::real(raw, QueryTier::RawFallback));
        }

        if !self.config.demo_enabled || self.config.demo_population_size == 0 {
            debug!(requester = %query.requester, "All tiers empty");
            return Ok(NearbyResult::empty(QueryTier::Exhausted));
        }

        let demo = self.demo.generate(
            &origin,
            self.config.demo_population_size,
            radius_m,
            self.time_source.now(),
        );
        info!(requester = %query.requester, count = demo.len(), "No real candidates, serving demo population");
        Ok(NearbyResult::demo(retain_within_and_sort(demo, radius_m)))
    }
}
