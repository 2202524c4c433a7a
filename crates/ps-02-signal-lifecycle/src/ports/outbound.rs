//! Outbound port: the persistence RPCs the lifecycle depends on.

use async_trait::async_trait;
use shared_types::{ProximityError, Signal, UserId};
use std::time::Duration;

/// Signal write path of the persistence backend.
#[async_trait]
pub trait SignalGateway: Send + Sync {
    /// Insert or update the owner's signal row.
    async fn upsert_signal(&self, signal: &Signal) -> Result<(), ProximityError>;

    /// Remove the owner's signal row.
    async fn delete_signal(&self, owner: &UserId) -> Result<(), ProximityError>;

    /// Authoritative creation limit check.
    async fn check_signal_creation_rate_limit(&self, owner: &UserId) -> Result<bool, ProximityError>;

    /// Estimated wait before the next allowed creation.
    async fn creation_retry_after(&self, _owner: &UserId) -> Option<Duration> {
        None
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockSignalGateway;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct MockState {
        signals: HashMap<UserId, Signal>,
        creations: u32,
        upserts: u32,
        deletes: u32,
    }

    /// Mock gateway for tests.
    ///
    /// Counts creations against a fixed allowance; never ages them out.
    #[derive(Debug)]
    pub struct MockSignalGateway {
        state: Mutex<MockState>,
        creation_allowance: u32,
        fail_writes: Mutex<bool>,
    }

    impl MockSignalGateway {
        /// Create a gateway that allows `creation_allowance` creations.
        pub fn new(creation_allowance: u32) -> Self {
            Self {
                state: Mutex::new(MockState::default()),
                creation_allowance,
                fail_writes: Mutex::new(false),
            }
        }

        /// Make every write fail with `PersistenceUnavailable`.
        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock() = fail;
        }

        pub fn stored(&self, owner: &UserId) -> Option<Signal> {
            self.state.lock().signals.get(owner).cloned()
        }

        pub fn creations(&self) -> u32 {
            self.state.lock().creations
        }

        pub fn upserts(&self) -> u32 {
            self.state.lock().upserts
        }

        pub fn deletes(&self) -> u32 {
            self.state.lock().deletes
        }

        fn check_writable(&self) -> Result<(), ProximityError> {
            if *self.fail_writes.lock() {
                return Err(ProximityError::PersistenceUnavailable("mock write failure".into()));
            }
            Ok(())
        }
    }

    impl Default for MockSignalGateway {
        fn default() -> Self {
            Self::new(u32::MAX)
        }
    }

    #[async_trait]
    impl SignalGateway for MockSignalGateway {
        async fn upsert_signal(&self, signal: &Signal) -> Result<(), ProximityError> {
            self.check_writable()?;
            let mut state = self.state.lock();
            if !state.signals.contains_key(&signal.owner_id) {
                state.creations += 1;
            }
            state.upserts += 1;
            state.signals.insert(signal.owner_id.clone(), signal.clone());
            Ok(())
        }

        async fn delete_signal(&self, owner: &UserId) -> Result<(), ProximityError> {
            self.check_writable()?;
            let mut state = self.state.lock();
            state.deletes += 1;
            state.signals.remove(owner);
            Ok(())
        }

        async fn check_signal_creation_rate_limit(&self, _owner: &UserId) -> Result<bool, ProximityError> {
            self.check_writable()?;
            Ok(self.state.lock().creations < self.creation_allowance)
        }
    }
}
