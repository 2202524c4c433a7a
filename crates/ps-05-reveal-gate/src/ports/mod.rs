//! Ports: the reveal API (inbound) and its ledger/profile dependencies (outbound).

pub mod inbound;
pub mod outbound;

pub use inbound::RevealApi;
pub use outbound::{ExtendedProfileSource, RevealLedger};
