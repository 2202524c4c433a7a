//! # Adapter Implementations
//!
//! Concrete implementations of the subsystems' outbound ports.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ps-02 SignalGateway        ┐                                │
//! │  ps-03 SignalQueryGateway   │                                │
//! │  ps-03 ProfileDirectory     ├──> StoreAdapter ──> ps-01 store│
//! │  ps-03 GhostModeLookup      │                                │
//! │  ps-05 RevealLedger         │                                │
//! │  ps-05 ExtendedProfileSource┘                                │
//! │                                                              │
//! │  ps-04 ArrivalNotifier ─────> TracingNotifier                │
//! │  ps-03 ProximityQueryApi ───> MeteredQuery (decorator)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod metered_query;
pub mod notifier;
pub mod store;

pub use metered_query::MeteredQuery;
pub use notifier::TracingNotifier;
pub use store::StoreAdapter;
