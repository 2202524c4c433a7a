//! # Error Types
//!
//! The error taxonomy shared by every subsystem.
//!
//! Prerequisite errors (`NotAuthenticated`, `NoPosition`, `ValidationError`)
//! are raised before any network call. `RateLimitExceeded` and
//! `PrivacyDenied` are terminal for the attempted action.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the Proximity Signal Engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProximityError {
    /// No signed-in identity.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The position provider has no fix.
    #[error("No position fix available")]
    NoPosition,

    /// A client or server rate limit denied the action.
    #[error("Rate limit exceeded for {action}")]
    RateLimitExceeded {
        /// Action key that was limited (e.g. `signal-creation`).
        action: String,
        /// How long until a retry may succeed, when known.
        retry_after: Option<Duration>,
    },

    /// The persistence/RPC layer could not be reached.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// A privacy setting forbids the action.
    #[error("Privacy denied: {0}")]
    PrivacyDenied(String),

    /// Input rejected before any network call.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The realtime channel could not be (re)established.
    #[error("Subscription failure: {0}")]
    SubscriptionFailure(String),
}

impl ProximityError {
    /// Build a rate-limit error.
    pub fn rate_limited(action: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimitExceeded {
            action: action.into(),
            retry_after,
        }
    }

    /// Retry-after hint carried by rate-limit errors.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// True for denials that end the attempted action and must be shown.
    #[must_use]
    pub fn is_terminal_denial(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::PrivacyDenied(_)
        )
    }
}
