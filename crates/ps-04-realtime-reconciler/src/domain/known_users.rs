//! Identities already announced during the current broadcast session.

use shared_types::UserId;
use std::collections::HashSet;

/// Per-session dedup set for arrival notices.
///
/// Owned by one reconciler; cleared whenever the requester stops
/// broadcasting.
#[derive(Debug, Default, Clone)]
pub struct KnownUsersSet {
    ids: HashSet<UserId>,
}

impl KnownUsersSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`. Returns `false` if it was already known.
    pub fn insert(&mut self, id: UserId) -> bool {
        self.ids.insert(id)
    }

    #[must_use]
    pub fn contains(&self, id: &UserId) -> bool {
        self.ids.contains(id)
    }

    /// Mark every id as known without announcing it.
    pub fn seed<I: IntoIterator<Item = UserId>>(&mut self, ids: I) {
        self.ids.extend(ids);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
