//! Integration flows and the fixture they share.

pub mod arrivals;
pub mod e2e_discovery;
pub mod fallback;
pub mod properties;
pub mod rate_limits;
pub mod reveals;

use ps_04_realtime_reconciler::RecordingNotifier;
use ps_runtime::{ClientSession, EngineConfig, EngineContainer};
use shared_types::{
    Coordinates, ExtendedProfile, Identity, LocalPreferences, ManualClock, RatingSnapshot,
    Timestamp, UserId,
};
use std::sync::Arc;
use std::time::Duration;

pub const T0: Timestamp = Timestamp::from_secs(1_700_000_000);

/// User A's spot in the Paris scenario.
pub const PARIS_A: Coordinates = Coordinates::new(48.8566, 2.3522);
/// ~23m from `PARIS_A`.
pub const PARIS_B: Coordinates = Coordinates::new(48.8568, 2.3521);

/// Container on a manual clock with a handful of registered profiles.
pub struct Harness {
    pub container: EngineContainer,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let container = EngineContainer::with_time_source(config, clock.clone())
            .expect("valid test config");
        for id in ["alice", "bob", "carol"] {
            container.register_profile(ExtendedProfile {
                user_id: UserId::new(id),
                display_name: capitalize(id),
                bio: format!("{id}'s bio"),
                interests: vec!["coffee".to_string()],
                rating: RatingSnapshot {
                    average: 4.0,
                    count: 3,
                },
            });
        }
        Self { container, clock }
    }

    pub fn testing() -> Self {
        Self::new(EngineConfig::for_testing())
    }

    pub async fn session(&self, id: &str, at: Coordinates) -> ClientSession {
        self.container
            .open_session(identity(id), Some(at), LocalPreferences::default())
            .await
            .expect("session opens")
    }

    pub async fn recording_session(
        &self,
        id: &str,
        at: Coordinates,
    ) -> (ClientSession, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let session = self
            .container
            .open_session_with_notifier(
                identity(id),
                Some(at),
                LocalPreferences::default(),
                notifier.clone(),
            )
            .await
            .expect("session opens");
        (session, notifier)
    }
}

pub fn identity(id: &str) -> Identity {
    Identity::new(id, format!("{id}@example.com"))
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Poll `condition` for up to one second.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

pub fn real_ids(session: &ClientSession) -> Vec<String> {
    session
        .snapshot()
        .result
        .real_candidates()
        .map(|c| c.owner_id.to_string())
        .collect()
}
