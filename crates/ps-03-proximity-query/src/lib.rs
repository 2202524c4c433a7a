//! # PS-03 Proximity Query
//!
//! Computes the ordered list of nearby broadcasting users.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Fallback Cascade
//!
//! | Tier | Source | Privacy | Output |
//! |------|--------|---------|--------|
//! | 1 | aggregate query | ghost mode filtered server-side | real |
//! | 2 | raw signals + profile lookup | ghost mode re-checked per row | real |
//! | 3 | demo generator | n/a | `demo_mode = true` |
//!
//! A tier runs only if every earlier tier produced nothing within the
//! radius. Backend failures count as empty; only prerequisite errors
//! (bad radius, bad position) are returned. A requester without a position
//! gets an empty list and no backend call.
//!
//! ## Module Structure
//!
//! ```text
//! ps-03-proximity-query/
//! ├── domain/          # NearbyQuery, NearbyResult, QueryTier
//! ├── algorithms/      # ranking, demo population
//! ├── ports/           # ProximityQueryApi (inbound), gateways (outbound)
//! ├── application/     # ProximityQueryService
//! └── config.rs        # QueryConfig
//! ```

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use algorithms::{
    candidate_from_row, candidate_from_signal, rank_rows, retain_within_and_sort,
    SeededDemoGenerator, DEMO_ID_PREFIX,
};
pub use application::ProximityQueryService;
pub use config::QueryConfig;
pub use domain::{NearbyQuery, NearbyResult, QueryTier};
pub use ports::{
    DemoGenerator, GhostModeLookup, ProfileDirectory, ProximityQueryApi, SignalQueryGateway,
};
