//! Pure algorithms: distance ranking and the demo population.

pub mod demo_population;
pub mod ranking;

pub use demo_population::{SeededDemoGenerator, DEMO_ID_PREFIX};
pub use ranking::{candidate_from_row, candidate_from_signal, rank_rows, retain_within_and_sort};
