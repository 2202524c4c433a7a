//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{EventFilter, RealtimeEvent};
use crate::subscriber::{EventSubscriber, Subscription, SubscriptionError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: RealtimeEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// The sender can be swapped out to simulate a dropped realtime connection.
pub struct InMemoryEventBus {
    /// Broadcast sender; `None` once the bus is closed.
    sender: RwLock<Option<broadcast::Sender<RealtimeEvent>>>,

    /// Active subscription count by topic.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: RwLock::new(Some(sender)),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Fails with [`SubscriptionError::Closed`] once the bus is closed.
    pub fn subscribe(&self, filter: EventFilter) -> Result<Subscription, SubscriptionError> {
        let receiver = match self.sender.read().as_ref() {
            Some(sender) => sender.subscribe(),
            None => return Err(SubscriptionError::Closed),
        };
        let topic_key = format!("{:?}", filter.topics);

        *self
            .subscriptions
            .write()
            .entry(topic_key.clone())
            .or_insert(0) += 1;

        let subscription =
            Subscription::new(receiver, filter, self.subscriptions.clone(), topic_key);
        debug!(id = %subscription.id(), topics = ?subscription.filter().topics, "New subscription created");
        Ok(subscription)
    }

    /// Drop every live connection. Existing subscriptions see `Closed`;
    /// new subscriptions succeed.
    pub fn reset_connections(&self) {
        let (sender, _) = broadcast::channel(self.capacity);
        *self.sender.write() = Some(sender);
        warn!("Realtime connections reset");
    }

    /// Close the bus. Existing subscriptions see `Closed` and new ones fail.
    pub fn close(&self) {
        *self.sender.write() = None;
        info!("Event bus closed");
    }

    /// Reopen a closed bus.
    pub fn reopen(&self) {
        let mut sender = self.sender.write();
        if sender.is_none() {
            *sender = Some(broadcast::channel(self.capacity).0);
            info!("Event bus reopened");
        }
    }

    /// True while the bus accepts subscriptions.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: RealtimeEvent) -> usize {
        let topic = event.topic();
        let kind = event.change_kind();

        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let sender = self.sender.read().clone();
        let Some(sender) = sender else {
            warn!(topic = ?topic, "Event dropped (bus closed)");
            return 0;
        };

        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    topic = ?topic,
                    kind = ?kind,
                    receivers = receiver_count,
                    "Event published"
                );
                receiver_count
            }
            Err(_) => {
                // No receivers - event is dropped
                debug!(topic = ?topic, kind = ?kind, "Event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, SubscriptionError> {
        InMemoryEventBus::subscribe(self, filter)
    }
}
