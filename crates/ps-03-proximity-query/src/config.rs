//! # Proximity Query Configuration

use serde::{Deserialize, Serialize};
use shared_types::DEFAULT_RADIUS_METERS;

/// Proximity query configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Radius used when the caller does not pass one.
    pub default_radius_m: u32,

    /// Re-check ghost mode per row on the raw fallback tier.
    pub recheck_ghost_mode_in_fallback: bool,

    /// Synthesize a demo population when both real tiers are empty.
    pub demo_enabled: bool,

    /// Size of the synthetic population.
    pub demo_population_size: usize,

    /// Display name for raw rows whose profile could not be resolved.
    pub fallback_display_name: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_radius_m: DEFAULT_RADIUS_METERS,
            recheck_ghost_mode_in_fallback: true,
            demo_enabled: true,
            demo_population_size: 6,
            fallback_display_name: "Anonymous".to_string(),
        }
    }
}

impl QueryConfig {
    /// Create a config for testing (small demo population).
    pub fn for_testing() -> Self {
        Self {
            demo_population_size: 3,
            ..Self::default()
        }
    }
}
