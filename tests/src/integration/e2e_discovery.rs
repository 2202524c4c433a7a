//! # End-to-End Discovery
//!
//! Two users ~23m apart in Paris. A sees B at the right distance, then B
//! stops broadcasting and A's list empties once the delete event lands.

#[cfg(test)]
mod tests {
    use super::super::{eventually, real_ids, Harness, PARIS_A, PARIS_B};
    use ps_runtime::EngineConfig;
    use shared_types::{Activity, SignalState, UserId};

    fn no_demo() -> EngineConfig {
        let mut config = EngineConfig::for_testing();
        config.query.demo_enabled = false;
        config
    }

    #[tokio::test]
    async fn test_paris_pair_meets_and_parts() {
        let h = Harness::new(no_demo());
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;

        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        let result = alice.nearby().await.unwrap();
        assert!(!result.demo_mode);
        assert_eq!(result.candidates.len(), 1);
        let bob_row = &result.candidates[0];
        assert_eq!(bob_row.owner_id, UserId::new("bob"));
        assert_eq!(bob_row.signal_state, SignalState::Green);
        assert_eq!(bob_row.activity, Activity::Studying);
        assert!(
            (bob_row.distance_meters - 23.0).abs() <= 5.0,
            "distance was {}",
            bob_row.distance_meters
        );

        bob.deactivate().await.unwrap();

        // The reconciled list follows the delete event.
        assert!(eventually(|| alice.snapshot().result.candidates.is_empty()).await);
        let result = alice.nearby().await.unwrap();
        assert!(result.candidates.is_empty());
        assert!(!result.demo_mode);
    }

    #[tokio::test]
    async fn test_bob_sees_alice_symmetrically() {
        let h = Harness::new(no_demo());
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        let from_alice = alice.nearby().await.unwrap().candidates[0].distance_meters;
        let from_bob = bob.nearby().await.unwrap().candidates[0].distance_meters;
        assert!((from_alice - from_bob).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_with_demo_enabled_departure_is_flagged_demo() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Coffee, SignalState::Yellow, None)
            .await
            .unwrap();
        assert!(eventually(|| real_ids(&alice) == vec!["bob".to_string()]).await);

        bob.deactivate().await.unwrap();

        assert!(eventually(|| alice.snapshot().result.demo_mode).await);
        let snapshot = alice.snapshot();
        assert!(snapshot.result.real_candidates().next().is_none());
        assert!(!snapshot.result.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_radius_user_not_listed() {
        let h = Harness::new(no_demo());
        let alice = h.session("alice", PARIS_A).await;
        // Roughly 1.1km north.
        let far = shared_types::Coordinates::new(48.8666, 2.3522);
        let carol = h.session("carol", far).await;
        carol
            .activate(Activity::Walking, SignalState::Green, None)
            .await
            .unwrap();

        assert!(alice.nearby().await.unwrap().candidates.is_empty());
        alice.set_radius(500).await.unwrap();
        assert!(alice.nearby().await.unwrap().candidates.is_empty());
    }

    #[tokio::test]
    async fn test_expired_signal_not_listed_before_purge() {
        let h = Harness::new(no_demo());
        let alice = h.session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        bob.close();

        h.clock.advance(shared_types::SIGNAL_TTL);

        // Row still stored, no longer served.
        assert_eq!(h.container.store().signal_count(), 1);
        assert!(alice.nearby().await.unwrap().candidates.is_empty());
        assert_eq!(h.container.store().purge_expired().await, 1);
    }
}
