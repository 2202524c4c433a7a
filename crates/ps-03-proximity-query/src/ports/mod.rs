//! Ports: the query API (inbound) and its persistence dependencies (outbound).

pub mod inbound;
pub mod outbound;

pub use inbound::ProximityQueryApi;
pub use outbound::{DemoGenerator, GhostModeLookup, ProfileDirectory, SignalQueryGateway};
