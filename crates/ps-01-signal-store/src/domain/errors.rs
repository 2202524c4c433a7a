//! Signal store errors.

use shared_types::{ProximityError, UserId};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the store's RPC surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend down or the operation was failed by fault injection.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Insert would exceed the creation ledger.
    #[error("signal creation limit reached for {owner}")]
    CreationLimitReached {
        owner: UserId,
        retry_after: Option<Duration>,
    },

    /// Target profile is hidden from the caller.
    #[error("profile {0} is hidden")]
    Hidden(UserId),

    /// Coordinates outside the valid lat/lon range.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

impl From<StoreError> for ProximityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => ProximityError::PersistenceUnavailable(reason),
            StoreError::CreationLimitReached { retry_after, .. } => {
                ProximityError::rate_limited("signal-creation", retry_after)
            }
            StoreError::Hidden(target) => {
                ProximityError::PrivacyDenied(format!("profile {target} is hidden"))
            }
            StoreError::InvalidCoordinates(detail) => ProximityError::ValidationError(detail),
        }
    }
}
