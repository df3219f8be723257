//! # Event Publisher
//!
//! The sending half of the bus. Every event goes to every receiver; topic
//! filtering happens in [`Subscription`].

use crate::events::{EventFilter, FilingEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing port handed to components as `Arc<dyn EventPublisher>`.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Returns how many receivers the event reached. Zero is not an error:
    /// a transition is committed whether or not anyone is listening.
    async fn publish(&self, event: FilingEvent) -> usize;
}

/// Process-local bus over `tokio::sync::broadcast`.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<FilingEvent>,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// `capacity` events are buffered per receiver before it lags.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "Subscribed");
        Subscription::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

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
    async fn publish(&self, event: FilingEvent) -> usize {
        let topic = event.topic();
        let source = event.source_component();
        // `send` only fails when there are no receivers.
        let reached = self.sender.send(event).unwrap_or(0);
        trace!(topic = ?topic, source, reached, "Published");
        reached
    }
}
