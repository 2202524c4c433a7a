use super::*;
use crate::ports::MockSignalGateway;
use crate::ExpiryWatcher;
use shared_types::{LatestPosition, ManualClock, SessionIdentity, UserId, SIGNAL_TTL};
use tokio::time::timeout;

const T0: Timestamp = Timestamp::from_millis(1_700_000_000_000);
const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);

struct Harness {
    manager: Arc<SignalLifecycleManager>,
    gateway: Arc<MockSignalGateway>,
    identity: Arc<SessionIdentity>,
    position: Arc<LatestPosition>,
    clock: Arc<ManualClock>,
}

fn harness_with(gateway: MockSignalGateway, limiter: ClientRateLimiter) -> Harness {
    let gateway = Arc::new(gateway);
    let identity = Arc::new(SessionIdentity::signed_in(Identity::new(
        "alice",
        "alice@example.com",
    )));
    let position = Arc::new(LatestPosition::at(PARIS));
    let clock = Arc::new(ManualClock::new(T0));
    let manager = Arc::new(SignalLifecycleManager::new(
        LifecycleConfig::for_testing(),
        identity.clone(),
        position.clone(),
        gateway.clone(),
        Arc::new(limiter),
        clock.clone(),
    ));
    Harness {
        manager,
        gateway,
        identity,
        position,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(MockSignalGateway::default(), ClientRateLimiter::new())
}

#[tokio::test]
async fn test_activate_requires_identity_and_position() {
    let h = harness();

    h.identity.sign_out();
    let err = h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap_err();
    assert_eq!(err, ProximityError::NotAuthenticated);

    h.identity.sign_in(Identity::new("alice", "alice@example.com"));
    h.position.clear();
    let err = h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap_err();
    assert_eq!(err, ProximityError::NoPosition);

    // Nothing reached the backend.
    assert_eq!(h.gateway.upserts(), 0);
    assert!(h.manager.current().await.is_none());
}

#[tokio::test]
async fn test_activate_creates_signal_with_two_hour_expiry() {
    let h = harness();
    let mut events = h.manager.subscribe_events();

    let signal = h
        .manager
        .activate(Activity::Studying, SignalState::Green, Some(" Library ".into()))
        .await
        .unwrap();

    assert_eq!(signal.owner_id, UserId::new("alice"));
    assert_eq!(signal.started_at, T0);
    assert_eq!(signal.expires_at, T0.saturating_add(SIGNAL_TTL));
    assert_eq!(signal.location_description.as_deref(), Some("Library"));
    assert_eq!(h.gateway.stored(&UserId::new("alice")), Some(signal.clone()));
    assert_eq!(events.try_recv().unwrap(), LifecycleEvent::Activated(signal));
}

#[tokio::test]
async fn test_reactivate_while_active_upserts_in_place() {
    let h = harness();
    let first = h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap();

    h.clock.advance(Duration::from_secs(60));
    let second = h
        .manager
        .activate(Activity::Coffee, SignalState::Yellow, None)
        .await
        .unwrap();

    assert_eq!(second.activity, Activity::Coffee);
    assert_eq!(second.started_at, first.started_at);
    assert_eq!(second.expires_at, first.expires_at);
    assert_eq!(h.gateway.creations(), 1);
    assert_eq!(
        h.manager.limiter.status(RateLimitAction::SignalCreation, h.clock.now()),
        shared_types::LimiterStatus::Open { remaining: 9 }
    );
}

#[tokio::test]
async fn test_update_and_cycle_are_noops_while_inactive() {
    let h = harness();

    assert_eq!(h.manager.update_position().await, Ok(None));
    assert_eq!(h.manager.cycle_state().await, Ok(None));
    assert_eq!(h.gateway.upserts(), 0);
    assert!(h.manager.current().await.is_none());
}

#[tokio::test]
async fn test_cycle_state_ring_order() {
    let h = harness();
    h.manager
        .activate(Activity::Chatting, SignalState::Green, None)
        .await
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        let signal = h.manager.cycle_state().await.unwrap().unwrap();
        seen.push(signal.signal_state);
    }
    assert_eq!(
        seen,
        vec![SignalState::Yellow, SignalState::Red, SignalState::Green]
    );
}

#[tokio::test]
async fn test_update_position_moves_live_signal() {
    let h = harness();
    h.manager
        .activate(Activity::Walking, SignalState::Green, None)
        .await
        .unwrap();

    let moved_to = Coordinates::new(48.857, 2.353);
    h.position.update(moved_to);
    let signal = h.manager.update_position().await.unwrap().unwrap();

    assert_eq!(signal.coordinates, moved_to);
    assert_eq!(
        h.gateway.stored(&UserId::new("alice")).map(|s| s.coordinates),
        Some(moved_to)
    );
}

#[tokio::test]
async fn test_extend_requires_active_and_resets_expiry() {
    let h = harness();
    assert!(matches!(
        h.manager.extend().await,
        Err(ProximityError::ValidationError(_))
    ));

    h.manager
        .activate(Activity::Working, SignalState::Green, None)
        .await
        .unwrap();
    h.clock.advance(Duration::from_secs(90 * 60));

    let extended = h.manager.extend().await.unwrap();
    assert_eq!(extended.expires_at, h.clock.now().saturating_add(SIGNAL_TTL));
    assert_eq!(extended.started_at, T0);
}

#[tokio::test]
async fn test_failed_write_leaves_state_unchanged() {
    let h = harness();
    let original = h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap();

    h.gateway.set_fail_writes(true);
    assert!(matches!(
        h.manager.cycle_state().await,
        Err(ProximityError::PersistenceUnavailable(_))
    ));
    assert!(h.manager.extend().await.is_err());
    assert!(h.manager.deactivate().await.is_err());

    assert_eq!(h.manager.current().await, Some(original));
}

#[tokio::test]
async fn test_failed_creation_write_stays_inactive() {
    let h = harness();
    h.gateway.set_fail_writes(true);

    assert!(h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .is_err());
    assert!(h.manager.current().await.is_none());
}

#[tokio::test]
async fn test_failed_creations_leave_client_budget_untouched() {
    let h = harness();
    h.gateway.set_fail_writes(true);
    for _ in 0..10 {
        assert!(matches!(
            h.manager
                .activate(Activity::Studying, SignalState::Green, None)
                .await,
            Err(ProximityError::PersistenceUnavailable(_))
        ));
    }
    assert_eq!(
        h.manager.limiter.status(RateLimitAction::SignalCreation, h.clock.now()),
        shared_types::LimiterStatus::Open { remaining: 10 }
    );

    h.gateway.set_fail_writes(false);
    let signal = h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap();
    assert_eq!(h.manager.current().await, Some(signal));
    assert_eq!(h.gateway.creations(), 1);
    assert_eq!(
        h.manager.limiter.status(RateLimitAction::SignalCreation, h.clock.now()),
        shared_types::LimiterStatus::Open { remaining: 9 }
    );
}

#[tokio::test]
async fn test_server_denial_makes_no_write() {
    let h = harness_with(MockSignalGateway::new(1), ClientRateLimiter::new());
    h.manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap();
    h.manager.deactivate().await.unwrap();

    let err = h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ProximityError::RateLimitExceeded { .. }));
    assert_eq!(h.gateway.upserts(), 1);
    assert!(h.manager.current().await.is_none());
    // The refused attempt did not spend a client slot.
    assert_eq!(
        h.manager.limiter.status(RateLimitAction::SignalCreation, h.clock.now()),
        shared_types::LimiterStatus::Open { remaining: 9 }
    );
}

#[tokio::test]
async fn test_client_limiter_blocks_before_network() {
    let limiter = ClientRateLimiter::new().with_config(
        RateLimitAction::SignalCreation,
        shared_types::RateLimitConfig::new(1, 3_600_000, 0),
    );
    let h = harness_with(MockSignalGateway::default(), limiter);
    h.manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap();
    h.manager.deactivate().await.unwrap();

    let err = h
        .manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap_err();
    assert_eq!(err.retry_after(), Some(Duration::from_secs(3_600)));
    assert_eq!(h.gateway.creations(), 1);
}

#[tokio::test]
async fn test_rejects_long_description() {
    let h = harness();
    let long = "x".repeat(500);
    assert!(matches!(
        h.manager
            .activate(Activity::Other, SignalState::Green, Some(long))
            .await,
        Err(ProximityError::ValidationError(_))
    ));
}

#[tokio::test]
async fn test_deactivate_is_noop_when_inactive() {
    let h = harness();
    assert_eq!(h.manager.deactivate().await, Ok(()));
    assert_eq!(h.gateway.deletes(), 0);
}

#[tokio::test]
async fn test_check_expiry_transitions_and_deletes() {
    let h = harness();
    let mut events = h.manager.subscribe_events();
    h.manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap();
    let _ = events.try_recv();

    assert!(!h.manager.check_expiry().await);
    h.clock.advance(SIGNAL_TTL);
    assert!(h.manager.current().await.is_none());
    assert!(h.manager.check_expiry().await);

    let event = events.try_recv().unwrap();
    assert!(event.ends_session());
    assert_eq!(h.gateway.deletes(), 1);
    assert!(h.gateway.stored(&UserId::new("alice")).is_none());
}

#[tokio::test]
async fn test_watcher_fires_expired_event() {
    let h = harness();
    let mut events = h.manager.subscribe_events();
    h.manager
        .activate(Activity::Studying, SignalState::Green, None)
        .await
        .unwrap();
    let _ = events.try_recv();

    let watcher = ExpiryWatcher::spawn(h.manager.clone());
    assert!(watcher.is_running());
    h.clock.advance(SIGNAL_TTL + Duration::from_secs(1));

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("watcher did not fire")
        .unwrap();
    assert!(matches!(event, LifecycleEvent::Expired { .. }));
    watcher.stop();
}
