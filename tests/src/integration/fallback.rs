//! # Fallback Cascade
//!
//! Store outages push discovery down the tiers: aggregate, raw signals with
//! a ghost-mode re-check, then a flagged demo population. An outage never
//! surfaces as an error.

#[cfg(test)]
mod tests {
    use super::super::{Harness, PARIS_A, PARIS_B};
    use ps_01_signal_store::FaultInjection;
    use ps_03_proximity_query::{QueryTier, DEMO_ID_PREFIX};
    use shared_types::{Activity, Provenance, SignalState};

    #[tokio::test]
    async fn test_aggregate_outage_uses_raw_tier() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        h.container.store().inject_faults(FaultInjection {
            aggregate_queries: true,
            ..FaultInjection::none()
        });

        let result = alice.nearby().await.unwrap();
        assert_eq!(result.tier, QueryTier::RawFallback);
        assert!(!result.demo_mode);
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].display_name, "Bob");
    }

    #[tokio::test]
    async fn test_raw_tier_still_honours_ghost_mode() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        bob.set_ghost_mode(true).await.unwrap();

        h.container.store().inject_faults(FaultInjection {
            aggregate_queries: true,
            ..FaultInjection::none()
        });

        let result = alice.nearby().await.unwrap();
        assert_eq!(result.tier, QueryTier::Demo);
        assert!(result.real_candidates().next().is_none());
    }

    #[tokio::test]
    async fn test_ghost_lookup_outage_fails_closed() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        h.container.store().inject_faults(FaultInjection {
            aggregate_queries: true,
            ghost_lookups: true,
            ..FaultInjection::none()
        });

        let result = alice.nearby().await.unwrap();
        assert!(result.demo_mode);
    }

    #[tokio::test]
    async fn test_total_outage_serves_flagged_demo() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        h.container
            .store()
            .inject_faults(FaultInjection::total_outage());

        let result = alice.nearby().await.unwrap();

        assert!(result.demo_mode);
        assert_eq!(result.tier, QueryTier::Demo);
        assert!(!result.candidates.is_empty());
        assert!(result.candidates.iter().all(|c| {
            c.provenance == Provenance::Demo && c.owner_id.as_str().starts_with(DEMO_ID_PREFIX)
        }));
        assert!(result
            .candidates
            .windows(2)
            .all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[tokio::test]
    async fn test_aggregate_hit_is_not_demo() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        let result = alice.nearby().await.unwrap();
        assert_eq!(result.tier, QueryTier::Aggregate);
        assert!(!result.demo_mode);
        assert!(result.candidates.iter().all(|c| c.is_real()));
    }

    #[tokio::test]
    async fn test_recovery_after_outage() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        h.container
            .store()
            .inject_faults(FaultInjection::total_outage());
        assert!(alice.nearby().await.unwrap().demo_mode);

        h.container.store().inject_faults(FaultInjection::none());
        let result = alice.nearby().await.unwrap();
        assert_eq!(result.tier, QueryTier::Aggregate);
    }
}
