//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{EventFilter, RealtimeEvent};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed or the connection dropped.
    #[error("Event bus closed")]
    Closed,
}

/// Trait for subscribing to events from the bus.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, SubscriptionError>;
}

/// A subscription handle for receiving events.
///
/// When dropped, the subscription is cleaned up before `drop` returns, so
/// no further events are delivered through it.
pub struct Subscription {
    /// Handle id, for logs.
    id: Uuid,

    /// The broadcast receiver.
    receiver: broadcast::Receiver<RealtimeEvent>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Topic key for this subscription.
    topic_key: String,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        receiver: broadcast::Receiver<RealtimeEvent>,
        filter: EventFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        topic_key: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            receiver,
            filter,
            subscriptions,
            topic_key,
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Ok(event)` - The next matching event
    /// - `Err(SubscriptionError::Closed)` - The connection dropped
    pub async fn recv(&mut self) -> Result<RealtimeEvent, SubscriptionError> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(id = %self.id, lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available and matched
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<RealtimeEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Handle id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Explicitly end the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut subs = self.subscriptions.write();
        if let Some(count) = subs.get_mut(&self.topic_key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                subs.remove(&self.topic_key);
            }
        }
        debug!(id = %self.id, topic = %self.topic_key, "Subscription dropped");
    }
}
