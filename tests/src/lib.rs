//! # Proximity Signal Test Suite
//!
//! Cross-crate flows run against the real wiring in `ps-runtime`: the
//! in-memory store, the event bus and one `ClientSession` per user.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/              # criterion benchmarks (distance, ranking)
//! └── src/integration/
//!     ├── e2e_discovery.rs  # two users meeting, leaving
//!     ├── fallback.rs       # aggregate → raw → demo cascade under outages
//!     ├── rate_limits.rs    # creation ledger, client limiter
//!     ├── reveals.rs        # per-pair reveal cooldown
//!     ├── properties.rs     # proptest layouts around one viewer
//!     └── arrivals.rs       # one notice per identity per broadcast
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ps-tests
//! cargo test -p ps-tests integration::fallback
//! cargo bench -p ps-tests
//! ```

#![allow(dead_code)]

pub mod integration;
