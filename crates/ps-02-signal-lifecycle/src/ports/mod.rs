//! Ports: the lifecycle API (inbound) and the persistence gateway (outbound).

pub mod inbound;
pub mod outbound;

pub use inbound::SignalLifecycleApi;
pub use outbound::SignalGateway;

#[cfg(any(test, feature = "test-utils"))]
pub use outbound::MockSignalGateway;
