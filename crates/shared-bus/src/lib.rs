//! # Shared Bus - Realtime Change Events
//!
//! The realtime/event-stream collaborator of the Proximity Signal Engine.
//! The signal store publishes a change event for every insert, update and
//! delete on the signal collection, and for ghost-mode toggles on the
//! profile collection. Reconcilers subscribe with a filter.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Signal Store │                    │  Reconciler  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery
//!
//! - Events for one topic arrive in emission order.
//! - Delivery is at-least-once from the consumer's point of view; a lagging
//!   subscriber skips ahead and must tolerate gaps by recomputing.
//! - Dropping a [`Subscription`] unsubscribes it synchronously.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ChangeKind, EventFilter, EventTopic, RealtimeEvent, SignalChange};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
