//! # Signal Creation Limits
//!
//! Ten creations per rolling hour. The client limiter refuses the 11th on
//! the same device; the server ledger refuses it from any device. Both
//! reopen once the window has passed.

#[cfg(test)]
mod tests {
    use super::super::{Harness, PARIS_A};
    use shared_types::{Activity, LimiterStatus, ProximityError, SignalState};
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3_600);

    async fn burn_ten(session: &ps_runtime::ClientSession) {
        for _ in 0..10 {
            session
                .activate(Activity::Studying, SignalState::Green, None)
                .await
                .unwrap();
            session.deactivate().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_eleventh_creation_refused_on_same_device() {
        let h = Harness::testing();
        let phone = h.session("alice", PARIS_A).await;
        burn_ten(&phone).await;

        assert!(matches!(phone.creation_status(), LimiterStatus::Blocked { .. }));
        let err = phone
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap_err();
        match err {
            ProximityError::RateLimitExceeded { action, retry_after } => {
                assert_eq!(action, "signal-creation");
                assert_eq!(retry_after, Some(HOUR));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(phone.current_signal().await.is_none());
    }

    #[tokio::test]
    async fn test_server_ledger_refuses_fresh_device() {
        let h = Harness::testing();
        let phone = h.session("alice", PARIS_A).await;
        burn_ten(&phone).await;

        let laptop = h.session("alice", PARIS_A).await;
        assert!(matches!(
            laptop.creation_status(),
            LimiterStatus::Open { remaining: 10 }
        ));

        let err = laptop
            .activate(Activity::Working, SignalState::Yellow, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProximityError::RateLimitExceeded { .. }));
        let retry_after = err.retry_after().expect("server estimate");
        assert!(retry_after <= HOUR);
        assert_eq!(h.container.store().signal_count(), 0);
    }

    #[tokio::test]
    async fn test_creation_allowed_after_window() {
        let h = Harness::testing();
        let phone = h.session("alice", PARIS_A).await;
        burn_ten(&phone).await;
        let laptop = h.session("alice", PARIS_A).await;
        assert!(laptop
            .activate(Activity::Working, SignalState::Green, None)
            .await
            .is_err());

        h.clock.advance(HOUR + Duration::from_secs(1));

        assert!(laptop
            .activate(Activity::Working, SignalState::Green, None)
            .await
            .is_ok());
        assert!(matches!(phone.creation_status(), LimiterStatus::Open { .. }));
    }

    #[tokio::test]
    async fn test_updates_do_not_consume_creations() {
        let h = Harness::testing();
        let phone = h.session("alice", PARIS_A).await;
        phone
            .activate(Activity::Studying, SignalState::Green, None)
            .await
            .unwrap();

        for _ in 0..15 {
            phone.cycle_state().await.unwrap();
            phone
                .activate(Activity::Coffee, SignalState::Red, None)
                .await
                .unwrap();
        }
        phone.extend().await.unwrap();

        assert!(matches!(
            phone.creation_status(),
            LimiterStatus::Open { remaining: 9 }
        ));
    }
}
