//! Query inputs and outputs.

use serde::{Deserialize, Serialize};
use shared_types::{Coordinates, NearbyCandidate, UserId};

/// A nearby-discovery request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    /// Who is asking; always excluded from results.
    pub requester: UserId,
    /// Requester's fix. `None` short-circuits to an empty result.
    pub position: Option<Coordinates>,
    /// Radius in meters (50..=500).
    pub radius_m: u32,
}

impl NearbyQuery {
    pub fn new(requester: UserId, position: Option<Coordinates>, radius_m: u32) -> Self {
        Self {
            requester,
            position,
            radius_m,
        }
    }
}

/// Which step of the cascade produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTier {
    /// No position; nothing was queried.
    Skipped,
    /// Privacy-filtered aggregate query.
    Aggregate,
    /// Raw signal query plus profile lookup.
    RawFallback,
    /// Synthetic population.
    Demo,
    /// Every tier empty and demo disabled.
    Exhausted,
}

impl QueryTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Aggregate => "aggregate",
            Self::RawFallback => "raw_fallback",
            Self::Demo => "demo",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Ordered candidates plus the degraded-mode flag.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyResult {
    /// Ascending by distance.
    pub candidates: Vec<NearbyCandidate>,
    /// True when the list is synthetic.
    pub demo_mode: bool,
    /// Tier that produced the list.
    pub tier: QueryTier,
}

impl NearbyResult {
    #[must_use]
    pub fn empty(tier: QueryTier) -> Self {
        Self {
            candidates: Vec::new(),
            demo_mode: false,
            tier,
        }
    }

    #[must_use]
    pub fn real(candidates: Vec<NearbyCandidate>, tier: QueryTier) -> Self {
        Self {
            candidates,
            demo_mode: false,
            tier,
        }
    }

    #[must_use]
    pub fn demo(candidates: Vec<NearbyCandidate>) -> Self {
        Self {
            candidates,
            demo_mode: true,
            tier: QueryTier::Demo,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Only the real candidates; what notifications and analytics may see.
    pub fn real_candidates(&self) -> impl Iterator<Item = &NearbyCandidate> {
        self.candidates.iter().filter(|c| c.is_real())
    }
}
