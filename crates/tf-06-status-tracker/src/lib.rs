//! # Status Tracker (TF-06)
//!
//! State machine and scheduler for the declaration lifecycle.
//!
//! ## Transitions
//!
//! | From | To |
//! |------|----|
//! | draft | ready |
//! | ready | draft, submitted, retry-pending, failed |
//! | submitted, processing | processing, accepted, rejected, retry-pending, failed |
//! | retry-pending | submitted, retry-pending, failed |
//! | failed | ready (operator reset only) |
//!
//! Accepted and rejected are final.
//!
//! ## Concurrency
//!
//! Each declaration has a single writer. Caller actions wait a bounded time
//! for its lock and then give up with `AlreadyInProgress`; the sweep skips
//! declarations that are busy. A due `retry-pending` declaration is picked up
//! by the next sweep; there is no separate retry worker.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{InMemoryDeclarationRepository, ManualClock, SystemClock};
pub use domain::errors::{RepositoryError, TrackerError, TrackerResult};
pub use domain::locks::{DeclarationGuard, LockRegistry};
pub use domain::machine::{next_status, StatusEvent};
pub use ports::inbound::{StatusTrackerApi, SweepReport};
pub use ports::outbound::{Clock, DeclarationRepository};
pub use service::{StatusTracker, TrackerConfig, DEFAULT_BATCH_SIZE, DEFAULT_LOCK_WAIT};
