//! # Proximity Signal Runtime
//!
//! Runs the engine in-process and simulates two users meeting in Paris:
//!
//! 1. Alice and Bob open sessions ~23m apart.
//! 2. Both start broadcasting; Alice sees Bob and gets one arrival notice.
//! 3. Alice reveals Bob's extended profile (a second reveal is refused).
//! 4. Bob stops broadcasting and drops off Alice's list.
//!
//! Configuration comes from the TOML file named by `PS_CONFIG`, with
//! `PS_DEFAULT_RADIUS_M` and `PS_DEMO_ENABLED` overriding single fields.

use anyhow::{Context, Result};
use ps_runtime::{EngineConfig, EngineContainer};
use ps_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use shared_types::{
    Activity, Coordinates, ExtendedProfile, Identity, LocalPreferences, RatingSnapshot,
    SignalState, UserId,
};
use std::time::Duration;
use tracing::{debug, info, warn};

const ALICE_AT: Coordinates = Coordinates::new(48.8566, 2.3522);
const BOB_AT: Coordinates = Coordinates::new(48.8568, 2.3521);

fn load_config() -> Result<EngineConfig> {
    let mut config = match std::env::var("PS_CONFIG") {
        Ok(path) => EngineConfig::load(&path).with_context(|| format!("loading {path}"))?,
        Err(_) => EngineConfig::default(),
    };

    if let Ok(radius) = std::env::var("PS_DEFAULT_RADIUS_M") {
        match radius.parse() {
            Ok(r) => config.query.default_radius_m = r,
            Err(_) => warn!("PS_DEFAULT_RADIUS_M must be an integer, ignoring"),
        }
    }
    if let Ok(flag) = std::env::var("PS_DEMO_ENABLED") {
        config.query.demo_enabled = matches!(flag.as_str(), "1" | "true" | "yes");
    }

    config.validate().context("validating configuration")?;
    Ok(config)
}

fn profile(id: &str, name: &str, bio: &str, interests: &[&str]) -> ExtendedProfile {
    ExtendedProfile {
        user_id: UserId::new(id),
        display_name: name.to_string(),
        bio: bio.to_string(),
        interests: interests.iter().map(|s| (*s).to_string()).collect(),
        rating: RatingSnapshot {
            average: 4.6,
            count: 12,
        },
    }
}

async fn run_scenario(container: &EngineContainer) -> Result<()> {
    container.register_profile(profile("alice", "Alice", "Thesis on urban mobility", &["cycling"]));
    container.register_profile(profile("bob", "Bob", "Always up for a coffee", &["chess", "jazz"]));

    let alice = container
        .open_session(
            Identity::new("alice", "alice@example.com"),
            Some(ALICE_AT),
            LocalPreferences::default(),
        )
        .await
        .context("opening Alice's session")?;
    let bob = container
        .open_session(
            Identity::new("bob", "bob@example.com"),
            Some(BOB_AT),
            LocalPreferences::default(),
        )
        .await
        .context("opening Bob's session")?;

    alice
        .activate(Activity::Studying, SignalState::Green, Some("Library, 2nd floor".into()))
        .await
        .context("activating Alice")?;
    bob.activate(Activity::Studying, SignalState::Green, None)
        .await
        .context("activating Bob")?;

    let nearby = alice.nearby().await?;
    info!(tier = nearby.tier.as_str(), demo_mode = nearby.demo_mode, "Alice's nearby list");
    for candidate in &nearby.candidates {
        info!(
            who = %candidate.display_name,
            distance_m = candidate.distance_meters.round(),
            state = ?candidate.signal_state,
            "  candidate"
        );
    }

    match alice.reveal(&UserId::new("bob")).await {
        Ok(profile) => info!(name = %profile.display_name, bio = %profile.bio, "Profile revealed"),
        Err(e) => warn!(error = %e, "Reveal failed"),
    }
    if let Err(e) = alice.reveal(&UserId::new("bob")).await {
        info!(error = %e, retry_after = ?e.retry_after(), "Second reveal refused");
    }

    bob.deactivate().await.context("deactivating Bob")?;
    // Let the delete event reach Alice's reconciler.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let snapshot = alice.snapshot();
    info!(
        real = snapshot.result.real_candidates().count(),
        demo_mode = snapshot.result.demo_mode,
        stale = snapshot.stale,
        "Alice's list after Bob left"
    );

    alice.deactivate().await?;
    alice.close();
    bob.close();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env()).context("initializing telemetry")?;

    let config = load_config()?;

    info!("===========================================");
    info!("  Proximity Signal Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let container = EngineContainer::new(config).context("building engine container")?;
    container.start_purge_task();

    run_scenario(&container).await?;

    match encode_metrics() {
        Ok(text) => debug!(metrics = %text, "Metrics snapshot"),
        Err(e) => warn!(error = %e, "Metrics encoding failed"),
    }

    if std::env::var("PS_EXIT_AFTER_DEMO").is_err() {
        info!("Engine is running. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await?;
    }

    container.shutdown();
    Ok(())
}
