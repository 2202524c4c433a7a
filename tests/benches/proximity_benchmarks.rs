//! # Proximity Signal Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | haversine distance | < 1µs per pair |
//! | rank 1,000 aggregate rows | < 1ms |
//! | demo population | < 100µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ps_03_proximity_query::{rank_rows, DemoGenerator, SeededDemoGenerator};
use shared_types::{
    haversine_distance, offset_coordinates, Activity, Coordinates, NearbySignalRow,
    RatingSnapshot, Signal, SignalState, Timestamp, UserId, SIGNAL_TTL,
};

const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);
const NOW: Timestamp = Timestamp::from_secs(1_700_000_000);

fn rows(count: usize) -> Vec<NearbySignalRow> {
    (0..count)
        .map(|i| {
            let bearing = (i * 37 % 360) as f64;
            let meters = (i % 400) as f64 + 5.0;
            NearbySignalRow {
                signal: Signal::new(
                    UserId::new(format!("user-{i}")),
                    Activity::ALL[i % Activity::ALL.len()],
                    SignalState::Green,
                    offset_coordinates(&PARIS, bearing, meters),
                    None,
                    NOW,
                    SIGNAL_TTL,
                ),
                display_name: format!("User {i}"),
                rating: RatingSnapshot::default(),
            }
        })
        .collect()
}

fn bench_haversine(c: &mut Criterion) {
    let other = offset_coordinates(&PARIS, 45.0, 23.0);
    c.bench_function("haversine_distance", |b| {
        b.iter(|| haversine_distance(black_box(&PARIS), black_box(&other)))
    });
}

fn bench_rank_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_rows");
    for size in [10usize, 100, 1_000] {
        let input = rows(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| rank_rows(&PARIS, black_box(input.clone()), 200.0))
        });
    }
    group.finish();
}

fn bench_demo_population(c: &mut Criterion) {
    c.bench_function("demo_population_6", |b| {
        b.iter(|| SeededDemoGenerator.generate(black_box(&PARIS), 6, 200.0, NOW))
    });
}

criterion_group!(benches, bench_haversine, bench_rank_rows, bench_demo_population);
criterion_main!(benches);
