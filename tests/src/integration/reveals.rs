//! # Reveal Cooldown
//!
//! One extended-profile reveal per (viewer, target) pair per window. The
//! check and the log entry are a single atomic step in the store.

#[cfg(test)]
mod tests {
    use super::super::{Harness, PARIS_A};
    use ps_01_signal_store::FaultInjection;
    use shared_types::{ProximityError, UserId};
    use std::time::Duration;

    fn bob() -> UserId {
        UserId::new("bob")
    }

    #[tokio::test]
    async fn test_second_reveal_denied_until_window_passes() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;

        let profile = alice.reveal(&bob()).await.unwrap();
        assert_eq!(profile.display_name, "Bob");
        assert_eq!(profile.interests, vec!["coffee".to_string()]);

        h.clock.advance(Duration::from_secs(600));
        let err = alice.reveal(&bob()).await.unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3_000)));

        let store = h.container.store();
        assert_eq!(store.reveal_entries(&UserId::new("alice"), &bob()), 1);

        h.clock.advance(Duration::from_secs(3_001));
        assert!(alice.reveal(&bob()).await.is_ok());
        assert_eq!(store.reveal_entries(&UserId::new("alice"), &bob()), 2);
    }

    #[tokio::test]
    async fn test_pairs_are_directional() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let bob_session = h.session("bob", PARIS_A).await;

        assert!(alice.reveal(&bob()).await.is_ok());
        assert!(bob_session.reveal(&UserId::new("alice")).await.is_ok());
        assert!(alice.reveal(&UserId::new("carol")).await.is_ok());
    }

    #[tokio::test]
    async fn test_ghost_target_is_privacy_denied() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        let carol = h.session("carol", PARIS_A).await;
        carol.set_ghost_mode(true).await.unwrap();

        let err = alice.reveal(&UserId::new("carol")).await.unwrap_err();
        assert!(matches!(err, ProximityError::PrivacyDenied(_)));
        assert!(err.is_terminal_denial());
        let store = h.container.store();
        assert_eq!(store.reveal_entries(&UserId::new("alice"), &UserId::new("carol")), 0);

        // Leaving ghost mode does not leave alice in a cooldown.
        carol.set_ghost_mode(false).await.unwrap();
        assert!(alice.reveal(&UserId::new("carol")).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_outage_denies_without_logging() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        h.container.store().inject_faults(FaultInjection {
            reveal_checks: true,
            ..FaultInjection::none()
        });

        let err = alice.reveal(&bob()).await.unwrap_err();
        assert!(matches!(err, ProximityError::PersistenceUnavailable(_)));
        assert_eq!(
            h.container
                .store()
                .reveal_entries(&UserId::new("alice"), &bob()),
            0
        );
    }

    #[tokio::test]
    async fn test_self_reveal_rejected() {
        let h = Harness::testing();
        let alice = h.session("alice", PARIS_A).await;
        assert!(matches!(
            alice.reveal(&UserId::new("alice")).await,
            Err(ProximityError::ValidationError(_))
        ));
    }
}
