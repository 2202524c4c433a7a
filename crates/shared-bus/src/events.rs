//! # Realtime Events
//!
//! Change events that flow through the shared bus. Signal events carry the
//! new and old row payloads; consumers must not trust them for privacy
//! state (ghost mode is not part of a signal row).

use serde::{Deserialize, Serialize};
use shared_types::entities::{Signal, UserId};

/// Row operation that produced a signal change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One change on the signal collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalChange {
    /// Operation kind.
    pub kind: ChangeKind,
    /// Row after the change (`None` for deletes).
    pub new: Option<Signal>,
    /// Row before the change (`None` for inserts).
    pub old: Option<Signal>,
}

impl SignalChange {
    #[must_use]
    pub fn insert(signal: Signal) -> Self {
        Self {
            kind: ChangeKind::Insert,
            new: Some(signal),
            old: None,
        }
    }

    #[must_use]
    pub fn update(old: Signal, new: Signal) -> Self {
        Self {
            kind: ChangeKind::Update,
            new: Some(new),
            old: Some(old),
        }
    }

    #[must_use]
    pub fn delete(old: Signal) -> Self {
        Self {
            kind: ChangeKind::Delete,
            new: None,
            old: Some(old),
        }
    }

    /// Owner of the changed row.
    #[must_use]
    pub fn owner_id(&self) -> Option<&UserId> {
        self.new
            .as_ref()
            .or(self.old.as_ref())
            .map(|signal| &signal.owner_id)
    }
}

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RealtimeEvent {
    /// Insert, update or delete on the signal collection.
    SignalChanged(SignalChange),

    /// A user toggled ghost mode on their profile.
    GhostModeChanged {
        /// Profile owner.
        owner_id: UserId,
        /// New flag value.
        enabled: bool,
    },
}

impl RealtimeEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SignalChanged(_) => EventTopic::Signals,
            Self::GhostModeChanged { .. } => EventTopic::Profiles,
        }
    }

    /// Row operation, if this is a signal change.
    #[must_use]
    pub fn change_kind(&self) -> Option<ChangeKind> {
        match self {
            Self::SignalChanged(change) => Some(change.kind),
            Self::GhostModeChanged { .. } => None,
        }
    }

    /// Identity the event is about.
    #[must_use]
    pub fn owner_id(&self) -> Option<&UserId> {
        match self {
            Self::SignalChanged(change) => change.owner_id(),
            Self::GhostModeChanged { owner_id, .. } => Some(owner_id),
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Signal collection changes.
    Signals,
    /// Profile flag changes.
    Profiles,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Signal change kinds to include. Empty means all kinds.
    pub kinds: Vec<ChangeKind>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            kinds: Vec::new(),
        }
    }

    /// Create a filter for specific signal change kinds.
    #[must_use]
    pub fn signals(kinds: Vec<ChangeKind>) -> Self {
        Self {
            topics: vec![EventTopic::Signals],
            kinds,
        }
    }

    /// Also accept profile events.
    #[must_use]
    pub fn with_profiles(mut self) -> Self {
        if !self.topics.is_empty() && !self.topics.contains(&EventTopic::Profiles) {
            self.topics.push(EventTopic::Profiles);
        }
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RealtimeEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let kind_match = match event.change_kind() {
            Some(kind) => self.kinds.is_empty() || self.kinds.contains(&kind),
            None => true,
        };

        topic_match && kind_match
    }
}
