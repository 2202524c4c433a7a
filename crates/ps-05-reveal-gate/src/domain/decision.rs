//! Outcome of a reveal check.

use shared_types::ProximityError;
use std::time::Duration;

/// Result of the atomic check-and-log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealDecision {
    /// Logged; the extended profile may be shown.
    Allowed,
    /// Pair is over its cap.
    Denied { retry_after: Option<Duration> },
    /// Target is hidden; nothing was logged.
    Hidden(String),
    /// The check itself failed. Treated as a denial.
    Unavailable(String),
}

impl RevealDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Error to surface for anything but `Allowed`.
    #[must_use]
    pub fn into_error(self) -> Option<ProximityError> {
        match self {
            Self::Allowed => None,
            Self::Denied { retry_after } => Some(ProximityError::rate_limited("reveal", retry_after)),
            Self::Hidden(reason) => Some(ProximityError::PrivacyDenied(reason)),
            Self::Unavailable(reason) => Some(ProximityError::PersistenceUnavailable(reason)),
        }
    }
}
