//! Local, read-only user preferences.

use crate::errors::ProximityError;
use serde::{Deserialize, Serialize};

/// Smallest selectable visibility radius.
pub const MIN_RADIUS_METERS: u32 = 50;
/// Largest selectable visibility radius.
pub const MAX_RADIUS_METERS: u32 = 500;
/// Radius used when the user never chose one.
pub const DEFAULT_RADIUS_METERS: u32 = 200;

/// Preferences read from the device's local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalPreferences {
    /// Discovery radius in meters (50..=500).
    pub visibility_radius_m: u32,
    /// Hide own signal from others' discovery.
    pub ghost_mode: bool,
    /// Haptic feedback on arrivals.
    pub vibration_enabled: bool,
    /// Sound on arrivals.
    pub sound_enabled: bool,
}

impl Default for LocalPreferences {
    fn default() -> Self {
        Self {
            visibility_radius_m: DEFAULT_RADIUS_METERS,
            ghost_mode: false,
            vibration_enabled: true,
            sound_enabled: false,
        }
    }
}

impl LocalPreferences {
    /// Radius as meters, rejecting values outside the selectable range.
    pub fn radius_meters(&self) -> Result<f64, ProximityError> {
        validate_radius(self.visibility_radius_m)
    }
}

/// Check a radius against the selectable range.
pub fn validate_radius(radius_m: u32) -> Result<f64, ProximityError> {
    if (MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(&radius_m) {
        Ok(f64::from(radius_m))
    } else {
        Err(ProximityError::ValidationError(format!(
            "radius {radius_m}m outside {MIN_RADIUS_METERS}..={MAX_RADIUS_METERS}m"
        )))
    }
}
