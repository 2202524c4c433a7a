//! # Arrival Notices
//!
//! While a user broadcasts, each other identity entering their radius is
//! announced once. Repeated updates, re-broadcasts and ghost-mode users
//! never produce a second (or any) notice within the same session.

#[cfg(test)]
mod tests {
    use super::super::{eventually, real_ids, Harness, PARIS_A, PARIS_B};
    use shared_types::{Activity, Coordinates, SignalState, UserId};
    use std::time::Duration;

    const NEAR_A: Coordinates = Coordinates::new(48.8565, 2.3524);

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_repeated_updates_announce_once() {
        let h = Harness::testing();
        let (alice, notices) = h.recording_session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        assert!(eventually(|| notices.count_for(&UserId::new("bob")) == 1).await);

        for _ in 0..3 {
            bob.cycle_state().await.unwrap();
        }
        bob.extend().await.unwrap();
        bob.deactivate().await.unwrap();
        bob.activate(Activity::Coffee, SignalState::Green, None)
            .await
            .unwrap();
        settle().await;

        assert_eq!(notices.count_for(&UserId::new("bob")), 1);
        let notice = &notices.notices()[0];
        assert!((notice.distance_meters - 23.0).abs() <= 5.0);
        assert!(notice.haptic);
        assert!(!notice.sound);
    }

    #[tokio::test]
    async fn test_already_listed_users_are_not_arrivals() {
        let h = Harness::testing();
        let (alice, notices) = h.recording_session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        assert!(eventually(|| real_ids(&alice) == vec!["bob".to_string()]).await);

        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        bob.cycle_state().await.unwrap();
        settle().await;

        assert!(notices.is_empty());
        assert_eq!(alice.reconciler().known_users_count(), 1);
    }

    #[tokio::test]
    async fn test_new_broadcast_session_starts_fresh() {
        let h = Harness::testing();
        let (alice, notices) = h.recording_session("alice", PARIS_A).await;
        let carol = h.session("carol", NEAR_A).await;
        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        carol
            .activate(Activity::Walking, SignalState::Green, None)
            .await
            .unwrap();
        assert!(eventually(|| notices.count_for(&UserId::new("carol")) == 1).await);

        alice.deactivate().await.unwrap();
        assert!(!alice.reconciler().arrivals_enabled());
        assert_eq!(alice.reconciler().known_users_count(), 0);

        // Carol leaves while Alice is off, then both come back.
        carol.deactivate().await.unwrap();
        assert!(eventually(|| real_ids(&alice).is_empty()).await);
        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        carol
            .activate(Activity::Walking, SignalState::Green, None)
            .await
            .unwrap();

        assert!(eventually(|| notices.count_for(&UserId::new("carol")) == 2).await);
    }

    #[tokio::test]
    async fn test_ghost_users_never_announced() {
        let h = Harness::testing();
        let (alice, notices) = h.recording_session("alice", PARIS_A).await;
        let carol = h.session("carol", NEAR_A).await;
        carol.set_ghost_mode(true).await.unwrap();
        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        carol
            .activate(Activity::Walking, SignalState::Green, None)
            .await
            .unwrap();
        settle().await;

        assert!(notices.is_empty());
        assert!(real_ids(&alice).is_empty());
    }

    #[tokio::test]
    async fn test_closed_session_gets_nothing() {
        let h = Harness::testing();
        let (alice, notices) = h.recording_session("alice", PARIS_A).await;
        let bob = h.session("bob", PARIS_B).await;
        alice
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        alice.close();

        bob.activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();
        settle().await;

        assert!(notices.is_empty());
    }
}
