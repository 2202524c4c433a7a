//! Candidate ranking.
//!
//! Exact distance is always computed client-side from the row's
//! coordinates; the server pre-filter is only a bounding box.

use shared_types::{
    haversine_distance, Coordinates, NearbyCandidate, NearbySignalRow, Provenance, RatingSnapshot,
    Signal,
};

/// Build a real candidate from a signal and its resolved profile fields.
pub fn candidate_from_signal(
    origin: &Coordinates,
    signal: Signal,
    display_name: String,
    rating: RatingSnapshot,
) -> NearbyCandidate {
    NearbyCandidate {
        distance_meters: haversine_distance(origin, &signal.coordinates),
        owner_id: signal.owner_id,
        display_name,
        signal_state: signal.signal_state,
        activity: signal.activity,
        coordinates: signal.coordinates,
        active_since: signal.started_at,
        rating,
        provenance: Provenance::Real,
    }
}

/// Build a real candidate from an aggregate query row.
pub fn candidate_from_row(origin: &Coordinates, row: NearbySignalRow) -> NearbyCandidate {
    candidate_from_signal(origin, row.signal, row.display_name, row.rating)
}

/// Keep candidates within `radius_m` (inclusive) and sort nearest first.
///
/// Ties break on owner id so the order is stable across recomputes.
pub fn retain_within_and_sort(
    mut candidates: Vec<NearbyCandidate>,
    radius_m: f64,
) -> Vec<NearbyCandidate> {
    candidates.retain(|c| c.distance_meters <= radius_m);
    candidates.sort_by(|a, b| {
        a.distance_meters
            .total_cmp(&b.distance_meters)
            .then_with(|| a.owner_id.cmp(&b.owner_id))
    });
    candidates
}

/// Rank aggregate rows around `origin`.
pub fn rank_rows(
    origin: &Coordinates,
    rows: Vec<NearbySignalRow>,
    radius_m: f64,
) -> Vec<NearbyCandidate> {
    let candidates = rows
        .into_iter()
        .map(|row| candidate_from_row(origin, row))
        .collect();
    retain_within_and_sort(candidates, radius_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::{offset_coordinates, Activity, SignalState, Timestamp, UserId, SIGNAL_TTL};

    const ORIGIN: Coordinates = Coordinates::new(48.8566, 2.3522);

    fn row_at(owner: &str, bearing: f64, meters: f64) -> NearbySignalRow {
        NearbySignalRow {
            signal: Signal::new(
                UserId::new(owner),
                Activity::Coffee,
                SignalState::Green,
                offset_coordinates(&ORIGIN, bearing, meters),
                None,
                Timestamp::from_secs(1),
                SIGNAL_TTL,
            ),
            display_name: owner.to_uppercase(),
            rating: RatingSnapshot::default(),
        }
    }

    #[test]
    fn test_rank_filters_and_sorts() {
        let rows = vec![
            row_at("far", 0.0, 450.0),
            row_at("near", 90.0, 30.0),
            row_at("mid", 180.0, 120.0),
        ];

        let ranked = rank_rows(&ORIGIN, rows, 200.0);
        let owners: Vec<_> = ranked.iter().map(|c| c.owner_id.as_str()).collect();
        assert_eq!(owners, vec!["near", "mid"]);
        assert!((ranked[0].distance_meters - 30.0).abs() < 0.01);
        assert!(ranked.iter().all(|c| c.provenance == Provenance::Real));
    }

    #[test]
    fn test_ties_break_on_owner() {
        let rows = vec![row_at("b", 0.0, 50.0), row_at("a", 0.0, 50.0)];
        let ranked = rank_rows(&ORIGIN, rows, 200.0);
        assert_eq!(ranked[0].owner_id.as_str(), "a");
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let mut c = candidate_from_row(&ORIGIN, row_at("edge", 0.0, 10.0));
        c.distance_meters = 200.0;
        assert_eq!(retain_within_and_sort(vec![c], 200.0).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_ranked_output_is_ascending_and_bounded(
            placements in prop::collection::vec((0.0f64..360.0, 0.0f64..600.0), 0..25),
            radius in 50.0f64..500.0,
        ) {
            let rows = placements
                .iter()
                .enumerate()
                .map(|(i, (bearing, meters))| row_at(&format!("u{i}"), *bearing, *meters))
                .collect();

            let ranked = rank_rows(&ORIGIN, rows, radius);
            prop_assert!(ranked.iter().all(|c| c.distance_meters <= radius));
            prop_assert!(ranked
                .windows(2)
                .all(|w| w[0].distance_meters <= w[1].distance_meters));
        }
    }
}
