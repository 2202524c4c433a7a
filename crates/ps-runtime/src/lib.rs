//! # Proximity Signal Runtime Library
//!
//! Wires the subsystems over the in-memory store and event bus. The
//! `ps-runtime` binary drives a two-user demo on top of it; integration
//! tests use the same container.
//!
//! ## Modules
//!
//! - `config` - unified TOML configuration
//! - `adapters` - outbound port implementations over the store
//! - `container` - process-wide wiring (bus, store, purge task)
//! - `session` - one signed-in user's subsystems

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod config;
pub mod container;
pub mod session;

pub use config::{BusConfig, ConfigError, EngineConfig, RuntimeConfig};
pub use container::EngineContainer;
pub use session::ClientSession;
