//! Outbound ports.

use crate::domain::ArrivalNotice;

/// Sink for arrival notices (in-app banner, haptics, sound).
///
/// `notify` runs on the reconciler's event task with its state lock
/// released. It may query the reconciler or end arrivals, but should return
/// promptly: `unsubscribe` and `end_arrivals` on other threads wait for it.
pub trait ArrivalNotifier: Send + Sync {
    fn notify(&self, notice: &ArrivalNotice);
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingNotifier;

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use super::*;
    use parking_lot::Mutex;
    use shared_types::UserId;

    /// Notifier that keeps every notice for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        notices: Mutex<Vec<ArrivalNotice>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn notices(&self) -> Vec<ArrivalNotice> {
            self.notices.lock().clone()
        }

        pub fn count_for(&self, owner: &UserId) -> usize {
            self.notices
                .lock()
                .iter()
                .filter(|n| &n.owner_id == owner)
                .count()
        }

        pub fn len(&self) -> usize {
            self.notices.lock().len()
        }

        pub fn is_empty(&self) -> bool {
            self.notices.lock().is_empty()
        }
    }

    impl ArrivalNotifier for RecordingNotifier {
        fn notify(&self, notice: &ArrivalNotice) {
            self.notices.lock().push(notice.clone());
        }
    }
}
