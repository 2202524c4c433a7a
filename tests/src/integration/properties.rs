//! # Discovery Properties
//!
//! Random layouts around one viewer. The nearby list holds exactly the
//! visible neighbours inside the radius, nearest first, whatever the
//! bearings, distances and ghost flags.

#[cfg(test)]
mod tests {
    use super::super::{Harness, PARIS_A};
    use proptest::prelude::*;
    use ps_runtime::EngineConfig;
    use shared_types::{haversine_distance, offset_coordinates, Activity, Coordinates, SignalState};

    fn check_layout(
        neighbours: Vec<(&'static str, Coordinates, bool)>,
        radius_m: u32,
    ) -> Result<(), TestCaseError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        runtime.block_on(async move {
            let mut config = EngineConfig::for_testing();
            config.query.demo_enabled = false;
            let h = Harness::new(config);
            let alice = h.session("alice", PARIS_A).await;
            alice
                .activate(Activity::Studying, SignalState::Green, None)
                .await
                .unwrap();

            let mut others = Vec::new();
            for (id, at, ghost) in &neighbours {
                let session = h.session(id, *at).await;
                session
                    .activate(Activity::Coffee, SignalState::Yellow, None)
                    .await
                    .unwrap();
                if *ghost {
                    session.set_ghost_mode(true).await.unwrap();
                }
                others.push(session);
            }
            alice.set_radius(radius_m).await.unwrap();

            let mut expected: Vec<(String, f64)> = neighbours
                .iter()
                .filter(|(_, _, ghost)| !ghost)
                .map(|(id, at, _)| (id.to_string(), haversine_distance(&PARIS_A, at)))
                .filter(|(_, d)| *d <= f64::from(radius_m))
                .collect();
            expected.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

            let result = alice.nearby().await.unwrap();
            prop_assert!(!result.demo_mode);
            let listed: Vec<String> = result
                .candidates
                .iter()
                .map(|c| c.owner_id.to_string())
                .collect();
            let expected_ids: Vec<String> = expected.iter().map(|(id, _)| id.clone()).collect();
            prop_assert_eq!(listed, expected_ids);
            for (candidate, (_, distance)) in result.candidates.iter().zip(&expected) {
                prop_assert!((candidate.distance_meters - distance).abs() < 0.01);
            }
            Ok(())
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_nearby_lists_visible_neighbours_in_range(
            bob_bearing in 0.0f64..360.0,
            bob_meters in 0.0f64..800.0,
            carol_bearing in 0.0f64..360.0,
            carol_meters in 0.0f64..800.0,
            carol_ghost in any::<bool>(),
            radius_m in 50u32..=500,
        ) {
            let bob_at = offset_coordinates(&PARIS_A, bob_bearing, bob_meters);
            let carol_at = offset_coordinates(&PARIS_A, carol_bearing, carol_meters);
            // Stay clear of the radius edge so rounding cannot flip membership.
            for at in [&bob_at, &carol_at] {
                prop_assume!((haversine_distance(&PARIS_A, at) - f64::from(radius_m)).abs() > 1.0);
            }

            check_layout(
                vec![("bob", bob_at, false), ("carol", carol_at, carol_ghost)],
                radius_m,
            )?;
        }
    }
}
