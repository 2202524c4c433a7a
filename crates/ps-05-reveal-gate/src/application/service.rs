//! # Reveal Gate
//!
//! Extended profiles are only fetched after the ledger has atomically
//! checked and logged the reveal. There is no separate "log after use"
//! step, and an unanswerable check is a denial.

use crate::config::RevealConfig;
use crate::domain::RevealDecision;
use crate::ports::{ExtendedProfileSource, RevealApi, RevealLedger};
use async_trait::async_trait;
use shared_types::{ExtendedProfile, ProximityError, UserId};
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Reveal gate.
pub struct RevealGate {
    config: RevealConfig,
    ledger: Arc<dyn RevealLedger>,
    profiles: Arc<dyn ExtendedProfileSource>,
}

impl RevealGate {
    pub fn new(
        config: RevealConfig,
        ledger: Arc<dyn RevealLedger>,
        profiles: Arc<dyn ExtendedProfileSource>,
    ) -> Self {
        Self {
            config,
            ledger,
            profiles,
        }
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Run the check-and-log and classify the outcome.
    pub async fn decide(&self, viewer: &UserId, target: &UserId) -> RevealDecision {
        match self.ledger.check_and_log_reveal(viewer, target).await {
            Ok(true) => {
                debug!(viewer = %viewer, target = %target, "Reveal allowed");
                RevealDecision::Allowed
            }
            Ok(false) => {
                let retry_after = self
                    .ledger
                    .reveal_retry_after(viewer, target)
                    .await
                    .or_else(|| Some(self.config.default_cooldown()));
                info!(viewer = %viewer, target = %target, ?retry_after, "Reveal denied, pair cooling down");
                RevealDecision::Denied { retry_after }
            }
            Err(ProximityError::PrivacyDenied(reason)) => {
                info!(viewer = %viewer, target = %target, "Reveal refused, target hidden");
                RevealDecision::Hidden(reason)
            }
            Err(e) => {
                warn!(viewer = %viewer, target = %target, error = %e, "Reveal check failed, denying");
                RevealDecision::Unavailable(e.to_string())
            }
        }
    }
}

#[async_trait]
impl RevealApi for RevealGate {
    async fn check_and_log_reveal(&self, viewer: &UserId, target: &UserId) -> bool {
        self.decide(viewer, target).await.is_allowed()
    }

    async fn reveal(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<ExtendedProfile, ProximityError> {
        if viewer == target {
            return Err(ProximityError::ValidationError(
                "cannot reveal your own profile".to_string(),
            ));
        }
        if let Some(denial) = self.decide(viewer, target).await.into_error() {
            return Err(denial);
        }

        match self.profiles.fetch_extended_profile(viewer, target).await? {
            Some(profile) => Ok(profile),
            None => Err(ProximityError::ValidationError(format!(
                "no profile for {target}"
            ))),
        }
    }
}
