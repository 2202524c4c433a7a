//! Arrival screening.
//!
//! Everything that can be decided from the event payload alone. The
//! ghost-mode check is not part of this: payloads never carry trusted
//! privacy state, so it always goes back to the backend.

use super::known_users::KnownUsersSet;
use serde::{Deserialize, Serialize};
use shared_types::{
    haversine_distance, Activity, Coordinates, Signal, SignalState, Timestamp, UserId,
};

/// Outcome of screening one insert/update payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrivalScreen {
    /// The requester's own signal.
    OwnSignal,
    /// Already announced this session.
    AlreadyKnown,
    /// `expires_at` has passed.
    Expired,
    /// Farther than the radius.
    OutOfRange { distance_m: f64 },
    /// Passed every payload check; still needs the ghost-mode check.
    Candidate { distance_m: f64 },
}

/// Screen a signal payload for the arrival path.
pub fn screen_arrival(
    requester: &UserId,
    origin: &Coordinates,
    radius_m: f64,
    signal: &Signal,
    known: &KnownUsersSet,
    now: Timestamp,
) -> ArrivalScreen {
    if &signal.owner_id == requester {
        return ArrivalScreen::OwnSignal;
    }
    if known.contains(&signal.owner_id) {
        return ArrivalScreen::AlreadyKnown;
    }
    if signal.is_expired(now) {
        return ArrivalScreen::Expired;
    }
    let distance_m = haversine_distance(origin, &signal.coordinates);
    if distance_m > radius_m {
        return ArrivalScreen::OutOfRange { distance_m };
    }
    ArrivalScreen::Candidate { distance_m }
}

/// One-time "someone new is nearby" notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalNotice {
    pub owner_id: UserId,
    pub activity: Activity,
    pub signal_state: SignalState,
    pub distance_meters: f64,
    /// Vibrate, per local preference.
    pub haptic: bool,
    /// Play a sound, per local preference.
    pub sound: bool,
    pub at: Timestamp,
}
