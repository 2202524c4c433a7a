//! Ports: the reconciler API (inbound) and the notice sink (outbound).
//!
//! The event stream and the nearby query are consumed through
//! `shared_bus::EventSubscriber` and `ps_03_proximity_query` ports.

pub mod inbound;
pub mod outbound;

pub use inbound::RealtimeReconcilerApi;
pub use outbound::ArrivalNotifier;

#[cfg(any(test, feature = "test-utils"))]
pub use outbound::RecordingNotifier;
