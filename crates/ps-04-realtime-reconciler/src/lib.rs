//! # PS-04 Realtime Reconciler
//!
//! Keeps the nearby list current from the realtime change stream.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Event Handling
//!
//! ```text
//! [shared-bus] ──signal / ghost-mode event──→ [RealtimeReconciler]
//!                                               │
//!                    ┌──────────────────────────┴───────────────┐
//!                    ▼                                          ▼
//!        full recompute (ps-03)                    arrival path (broadcasting only)
//!                    │                              self? known? expired? in radius?
//!                    ▼                              ghost check (errors = ghost)
//!        watch::Sender<NearbySnapshot>                          │
//!                                                               ▼
//!                                                  KnownUsersSet + ArrivalNotifier
//! ```
//!
//! ## Session Rules
//!
//! - One subscription per reconciler; `subscribe` tears the old one down.
//! - Emissions check the session generation under the session lock, so
//!   nothing is delivered once `unsubscribe` returns.
//! - A dropped stream is resubscribed once; a second failure marks the
//!   snapshot `stale` and keeps the last list.
//! - `KnownUsersSet` lives for one broadcast session.

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::RealtimeReconciler;
pub use config::ReconcilerConfig;
pub use domain::{screen_arrival, ArrivalNotice, ArrivalScreen, KnownUsersSet, NearbySnapshot};
pub use ports::{ArrivalNotifier, RealtimeReconcilerApi};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::RecordingNotifier;
