//! # Shared Types Crate
//!
//! This crate contains the domain entities, the `ProximityError` taxonomy,
//! the distance calculator and the advisory client rate limiter shared by
//! every Proximity Signal subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Absolute Time**: Every timestamp is milliseconds since the Unix epoch,
//!   so expiry and lockout checks survive sleep/resume.
//! - **Provenance Everywhere**: Every `NearbyCandidate` says whether it is
//!   real or synthetic.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod errors;
pub mod geo;
pub mod preferences;
pub mod providers;
pub mod rate_limiter;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use geo::{bounding_box, haversine_distance, offset_coordinates, BoundingBox, EARTH_RADIUS_METERS};
pub use preferences::{
    validate_radius, LocalPreferences, DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS, MIN_RADIUS_METERS,
};
pub use providers::{
    IdentityProvider, InMemoryPreferences, LatestPosition, PositionProvider, PreferenceStore,
    SessionIdentity,
};
pub use rate_limiter::{ClientRateLimiter, LimiterStatus, RateLimitAction, RateLimitConfig};
pub use time::{SystemTimeSource, TimeSource, Timestamp};

#[cfg(any(test, feature = "test-utils"))]
pub use time::ManualClock;
