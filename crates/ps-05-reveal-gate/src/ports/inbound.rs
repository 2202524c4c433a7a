//! Inbound port.

use async_trait::async_trait;
use shared_types::{ExtendedProfile, ProximityError, UserId};

/// Reveal API.
#[async_trait]
pub trait RevealApi: Send + Sync {
    /// Atomic check-and-log. Any failure of the check returns `false`.
    async fn check_and_log_reveal(&self, viewer: &UserId, target: &UserId) -> bool;

    /// Check, log and fetch `target`'s extended profile.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for a self-reveal or a missing profile
    /// - `RateLimitExceeded` while the pair is cooling down
    /// - `PrivacyDenied` when the target is hidden
    /// - `PersistenceUnavailable` when the check could not run
    async fn reveal(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<ExtendedProfile, ProximityError>;
}
