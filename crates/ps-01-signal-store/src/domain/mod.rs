//! Domain layer for the signal store.

pub mod errors;
pub mod ledger;

pub use errors::StoreError;
pub use ledger::{CreationLedger, RevealLog};
