//! Lifecycle events surfaced to the UI.

use shared_types::{Signal, Timestamp, UserId};

/// Emitted after every committed lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// A new signal was created.
    Activated(Signal),
    /// The live signal changed (position, state, activity).
    Updated(Signal),
    /// The expiry was pushed out.
    Extended(Signal),
    /// The signal reached `expires_at` locally.
    Expired {
        owner_id: UserId,
        expired_at: Timestamp,
    },
    /// The user stopped broadcasting.
    Deactivated { owner_id: UserId },
}

impl LifecycleEvent {
    /// True for transitions that leave the manager inactive.
    #[must_use]
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::Expired { .. } | Self::Deactivated { .. })
    }
}
