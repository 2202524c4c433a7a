//! # PS-05 Reveal Gate
//!
//! Rate-limited access to another user's extended profile.
//!
//! **Subsystem ID:** 5
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Flow
//!
//! ```text
//! reveal(viewer, target)
//!   ├─ viewer == target        → ValidationError
//!   ├─ ledger check-and-log    → false: RateLimitExceeded("reveal", retry_after)
//!   │                          → error: denied (fail closed)
//!   └─ fetch extended profile  → hidden target: PrivacyDenied
//! ```

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::RevealGate;
pub use config::RevealConfig;
pub use domain::RevealDecision;
pub use ports::{ExtendedProfileSource, RevealApi, RevealLedger};
