//! Outbound ports.

use async_trait::async_trait;
use shared_types::{ExtendedProfile, ProximityError, UserId};
use std::time::Duration;

/// Server-side reveal ledger. The only authority on reveal quotas.
#[async_trait]
pub trait RevealLedger: Send + Sync {
    /// Check the per-pair cap and log the reveal in one atomic step.
    ///
    /// A hidden target is refused with `PrivacyDenied` and nothing is logged.
    async fn check_and_log_reveal(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<bool, ProximityError>;

    /// Estimated wait before the pair may reveal again.
    async fn reveal_retry_after(&self, _viewer: &UserId, _target: &UserId) -> Option<Duration> {
        None
    }
}

/// Extended profile fetch, subject to the target's privacy settings.
#[async_trait]
pub trait ExtendedProfileSource: Send + Sync {
    async fn fetch_extended_profile(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<Option<ExtendedProfile>, ProximityError>;
}
