//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `Identity`, `PublicProfile`, `ExtendedProfile`
//! - **Broadcast**: `Signal`, `SignalState`, `Activity`, `Coordinates`
//! - **Discovery**: `NearbySignalRow`, `NearbyCandidate`, `Provenance`

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How long a signal stays visible after creation or extension.
pub const SIGNAL_TTL: Duration = Duration::from_secs(2 * 60 * 60);

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Opaque user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Authenticated identity as handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id.
    pub user_id: UserId,
    /// Account email (never shown to other users).
    pub email: String,
}

impl Identity {
    /// Create an identity.
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            email: email.into(),
        }
    }
}

/// Aggregate rating at the time a candidate was computed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSnapshot {
    /// Mean rating, 0.0 when unrated.
    pub average: f32,
    /// Number of ratings.
    pub count: u32,
}

/// Publicly resolvable profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    /// Owner.
    pub user_id: UserId,
    /// Name shown in nearby lists.
    pub display_name: String,
    /// Rating snapshot.
    pub rating: RatingSnapshot,
}

/// Profile details only reachable through a reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedProfile {
    /// Owner.
    pub user_id: UserId,
    /// Name shown in nearby lists.
    pub display_name: String,
    /// Free-form bio.
    pub bio: String,
    /// Interest tags.
    pub interests: Vec<String>,
    /// Rating snapshot.
    pub rating: RatingSnapshot,
}

// =============================================================================
// CLUSTER B: BROADCAST
// =============================================================================

/// Traffic-light availability state of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    /// Open to interact.
    #[default]
    Green,
    /// Open, but busy.
    Yellow,
    /// Visible, not open right now.
    Red,
}

impl SignalState {
    /// Next state in ring order green → yellow → red → green.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Green => Self::Yellow,
            Self::Yellow => Self::Red,
            Self::Red => Self::Green,
        }
    }
}

/// What the owner is doing while broadcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Studying,
    Working,
    Coffee,
    Walking,
    Chatting,
    Exercising,
    Gaming,
    Other,
}

impl Activity {
    /// All activities, in display order.
    pub const ALL: [Activity; 8] = [
        Activity::Studying,
        Activity::Working,
        Activity::Coffee,
        Activity::Walking,
        Activity::Chatting,
        Activity::Exercising,
        Activity::Gaming,
        Activity::Other,
    ];

    /// Wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Studying => "studying",
            Self::Working => "working",
            Self::Coffee => "coffee",
            Self::Walking => "walking",
            Self::Chatting => "chatting",
            Self::Exercising => "exercising",
            Self::Gaming => "gaming",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A WGS84 position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Degrees, -90..=90.
    pub latitude: f64,
    /// Degrees, -180..=180.
    pub longitude: f64,
    /// Horizontal accuracy in meters, if the provider reports one.
    pub accuracy: Option<f64>,
}

impl Coordinates {
    /// Create a fix without accuracy.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    /// Attach a horizontal accuracy.
    #[must_use]
    pub const fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy = Some(meters);
        self
    }

    /// True if both axes are finite and in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A time-boxed availability broadcast.
///
/// At most one non-expired signal exists per owner; the store keys rows by
/// `owner_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub owner_id: UserId,
    pub signal_state: SignalState,
    pub activity: Activity,
    pub coordinates: Coordinates,
    pub location_description: Option<String>,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Signal {
    /// Create a fresh signal expiring `ttl` after `now`.
    #[must_use]
    pub fn new(
        owner_id: UserId,
        activity: Activity,
        signal_state: SignalState,
        coordinates: Coordinates,
        location_description: Option<String>,
        now: Timestamp,
        ttl: Duration,
    ) -> Self {
        Self {
            owner_id,
            signal_state,
            activity,
            coordinates,
            location_description,
            started_at: now,
            expires_at: now.saturating_add(ttl),
        }
    }

    /// A signal is expired once `expires_at <= now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// Copy with the expiry reset to `now + ttl`.
    #[must_use]
    pub fn extended(&self, now: Timestamp, ttl: Duration) -> Self {
        Self {
            expires_at: now.saturating_add(ttl),
            ..self.clone()
        }
    }

    /// Copy with the state advanced one step.
    #[must_use]
    pub fn cycled(&self) -> Self {
        Self {
            signal_state: self.signal_state.next(),
            ..self.clone()
        }
    }

    /// Copy at a new position.
    #[must_use]
    pub fn moved_to(&self, coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            ..self.clone()
        }
    }
}

// =============================================================================
// CLUSTER C: DISCOVERY
// =============================================================================

/// Row returned by the privileged, privacy-filtered nearby query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbySignalRow {
    pub signal: Signal,
    pub display_name: String,
    pub rating: RatingSnapshot,
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Backed by a real broadcasting user.
    Real,
    /// Synthesized for cold-start demo mode.
    Demo,
}

/// A nearby broadcasting user, computed per query cycle and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyCandidate {
    pub owner_id: UserId,
    pub display_name: String,
    pub signal_state: SignalState,
    pub activity: Activity,
    pub coordinates: Coordinates,
    pub distance_meters: f64,
    pub active_since: Timestamp,
    pub rating: RatingSnapshot,
    pub provenance: Provenance,
}

impl NearbyCandidate {
    /// True for real users; analytics and notifications must check this.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.provenance == Provenance::Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_signal() -> Signal {
        Signal::new(
            UserId::new("alice"),
            Activity::Studying,
            SignalState::Green,
            Coordinates::new(48.8566, 2.3522),
            None,
            Timestamp::from_secs(1_000),
            SIGNAL_TTL,
        )
    }

    #[test]
    fn test_signal_state_ring_order() {
        assert_eq!(SignalState::Green.next(), SignalState::Yellow);
        assert_eq!(SignalState::Yellow.next(), SignalState::Red);
        assert_eq!(SignalState::Red.next(), SignalState::Green);
    }

    #[test]
    fn test_signal_expires_two_hours_after_start() {
        let signal = sample_signal();
        assert_eq!(
            signal.expires_at,
            Timestamp::from_secs(1_000 + 2 * 60 * 60)
        );
        assert!(!signal.is_expired(Timestamp::from_secs(1_001)));
        assert!(signal.is_expired(signal.expires_at));
    }

    #[test]
    fn test_extended_resets_from_now() {
        let signal = sample_signal();
        let now = Timestamp::from_secs(5_000);
        let extended = signal.extended(now, SIGNAL_TTL);
        assert_eq!(extended.expires_at, now.saturating_add(SIGNAL_TTL));
        assert_eq!(extended.started_at, signal.started_at);
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(48.85, 2.35).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_activity_serializes_snake_case() {
        let json = serde_json::to_string(&Activity::Studying).unwrap();
        assert_eq!(json, "\"studying\"");
    }
}
