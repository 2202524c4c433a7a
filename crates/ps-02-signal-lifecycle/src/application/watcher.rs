//! # Expiry Watcher
//!
//! Background task that surfaces local expiry without waiting for a query.
//! It sleeps until the earlier of the signal's `expires_at` and the poll
//! bound, then calls `check_expiry`. Deadlines come from absolute
//! timestamps, so a suspended device catches up on the next wake.

use super::service::SignalLifecycleManager;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a running watcher. Dropping it stops the task.
pub struct ExpiryWatcher {
    handle: JoinHandle<()>,
}

impl ExpiryWatcher {
    /// Spawn a watcher for `manager` on the current runtime.
    pub fn spawn(manager: Arc<SignalLifecycleManager>) -> Self {
        let poll = manager.config().expiry_poll_interval();
        let handle = tokio::spawn(async move {
            loop {
                let wait = manager
                    .time_to_expiry()
                    .await
                    .map_or(poll, |remaining| remaining.min(poll));
                tokio::time::sleep(wait).await;
                if manager.check_expiry().await {
                    debug!("Expiry watcher observed expiry");
                }
            }
        });
        Self { handle }
    }

    /// Stop the watcher.
    pub fn stop(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ExpiryWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
