//! Domain layer: dedup set, arrival screening and snapshots.

pub mod arrival;
pub mod known_users;
pub mod snapshot;

pub use arrival::{screen_arrival, ArrivalNotice, ArrivalScreen};
pub use known_users::KnownUsersSet;
pub use snapshot::NearbySnapshot;
