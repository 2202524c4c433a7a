//! # Demo Population
//!
//! Cold-start fallback: a plausible set of nearby people around the
//! requester. Output is deterministic for a given anchor so the list does
//! not reshuffle on every recompute. Every candidate is tagged
//! `Provenance::Demo` and carries a `demo:` owner id.

use crate::ports::DemoGenerator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{
    offset_coordinates, Activity, Coordinates, NearbyCandidate, Provenance, RatingSnapshot,
    SignalState, Timestamp, UserId,
};
use std::time::Duration;

/// Prefix on every synthetic owner id.
pub const DEMO_ID_PREFIX: &str = "demo:";

const NAMES: [&str; 12] = [
    "Camille", "Hugo", "Léa", "Noah", "Chloé", "Lucas", "Inès", "Gabriel", "Manon", "Arthur",
    "Jade", "Louis",
];

/// Closest a synthetic candidate is placed to the anchor.
const MIN_DEMO_DISTANCE_M: f64 = 15.0;

/// Demo generator seeded from the anchor coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededDemoGenerator;

impl SeededDemoGenerator {
    fn seed_for(anchor: &Coordinates) -> u64 {
        anchor.latitude.to_bits() ^ anchor.longitude.to_bits().rotate_left(32)
    }
}

impl DemoGenerator for SeededDemoGenerator {
    fn generate(
        &self,
        anchor: &Coordinates,
        count: usize,
        within_m: f64,
        now: Timestamp,
    ) -> Vec<NearbyCandidate> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(anchor));
        let max_distance = (within_m * 0.9).max(MIN_DEMO_DISTANCE_M + 1.0);

        (0..count)
            .map(|i| {
                let name = NAMES[i % NAMES.len()];
                let bearing = rng.gen_range(0.0..360.0);
                let distance = rng.gen_range(MIN_DEMO_DISTANCE_M..max_distance);
                let coordinates = offset_coordinates(anchor, bearing, distance);
                // Mostly green, the way a real crowd looks.
                let signal_state = match rng.gen_range(0..10) {
                    0..=5 => SignalState::Green,
                    6..=8 => SignalState::Yellow,
                    _ => SignalState::Red,
                };
                let activity = Activity::ALL[rng.gen_range(0..Activity::ALL.len())];
                let minutes_active = rng.gen_range(1..90);

                NearbyCandidate {
                    owner_id: UserId::new(format!("{DEMO_ID_PREFIX}{i}-{}", name.to_lowercase())),
                    display_name: name.to_string(),
                    signal_state,
                    activity,
                    coordinates,
                    distance_meters: distance,
                    active_since: now.saturating_sub(Duration::from_secs(minutes_active * 60)),
                    rating: RatingSnapshot {
                        average: rng.gen_range(3.5..5.0),
                        count: rng.gen_range(1..40),
                    },
                    provenance: Provenance::Demo,
                }
            })
            .collect()
    }
}
