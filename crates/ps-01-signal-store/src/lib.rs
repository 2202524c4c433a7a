//! # PS-01 Signal Store
//!
//! Authoritative persistence/RPC backend for broadcast signals.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Domain ledgers + in-memory adapter
//!
//! ## Purpose
//!
//! Holds the signal and profile tables and the two server-side abuse
//! ledgers, and publishes a change event on the shared bus for every write:
//!
//! | RPC | Notes |
//! |-----|-------|
//! | `upsert_signal` | insert records a creation ledger entry |
//! | `delete_signal` | publishes a delete with the old row |
//! | `check_signal_creation_rate_limit` | 10 per owner per rolling hour |
//! | `query_nearby_signals` | privacy-filtered: live, non-ghost, not self |
//! | `query_raw_signals` | not privacy-filtered |
//! | `resolve_public_profiles` | batch display-name lookup |
//! | `check_and_log_reveal` | atomic per-pair cap |
//! | `get_ghost_mode` / `set_ghost_mode` | profile flag |
//!
//! Expired rows are invisible to every query even before
//! `purge_expired` removes them.
//!
//! ## Module Structure
//!
//! ```text
//! ps-01-signal-store/
//! ├── domain/      # StoreError, creation ledger, reveal log
//! ├── store.rs     # InMemorySignalStore
//! └── config.rs    # StoreConfig
//! ```

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod store;

pub use config::StoreConfig;
pub use domain::{CreationLedger, RevealLog, StoreError};
pub use store::{FaultInjection, InMemorySignalStore};
