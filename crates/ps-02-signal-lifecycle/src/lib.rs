//! # PS-02 Signal Lifecycle
//!
//! Owns the local user's time-boxed availability signal.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## State Machine
//!
//! ```text
//!             activate()                 cycle_state()
//! ┌──────────┐ ────────► ┌────────────────────────────────┐ ◄──┐
//! │ Inactive │           │ Active(green → yellow → red)   │ ───┘
//! └──────────┘ ◄──────── └────────────────────────────────┘
//!          deactivate() / expires_at ≤ now
//! ```
//!
//! ## Guarantees
//!
//! | Operation | Inactive | Active |
//! |-----------|----------|--------|
//! | `activate` | client limiter, server check, insert | upsert in place, no limit consumed |
//! | `update_position` | no-op | move |
//! | `cycle_state` | no-op | advance one step |
//! | `extend` | `ValidationError` | `expires_at = now + 2h` |
//! | `deactivate` | no-op | delete |
//!
//! A failed persistence write leaves local state unchanged.
//!
//! ## Module Structure
//!
//! ```text
//! ps-02-signal-lifecycle/
//! ├── domain/          # LifecycleState, LifecycleEvent, description rules
//! ├── ports/           # SignalLifecycleApi (inbound), SignalGateway (outbound)
//! ├── application/     # SignalLifecycleManager, ExpiryWatcher
//! └── config.rs        # LifecycleConfig
//! ```

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{ExpiryWatcher, SignalLifecycleManager};
pub use config::LifecycleConfig;
pub use domain::{normalize_description, LifecycleEvent, LifecycleState};
pub use ports::{SignalGateway, SignalLifecycleApi};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::MockSignalGateway;
