//! # Shared Bus - Event Bus for the Filing Pipeline
//!
//! Carries lifecycle events between pipeline components. The status tracker
//! publishes every committed transition here; the runtime's handlers consume
//! them (for example, validating the receipt of an accepted declaration).
//!
//! ## Choreography Pattern
//!
//! ```text
//! ┌────────────────┐                    ┌────────────────┐
//! │ Status Tracker │                    │ Confirmation   │
//! │                │    publish()       │ Handler        │
//! │                │ ──────┐            │                │
//! └────────────────┘       │            └────────────────┘
//!                          ▼                    ↑
//!                    ┌──────────────┐          │
//!                    │  Event Bus   │          │
//!                    │              │ ─────────┘
//!                    └──────────────┘  subscribe()
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{component_ids, EventFilter, EventTopic, FilingEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
