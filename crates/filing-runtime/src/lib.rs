//! # Filing Runtime Library
//!
//! Exposes the runtime's modules for the binary and for integration tests.
//!
//! ## Layout
//!
//! - `container/` - configuration and dependency injection
//! - `ports` / `adapters/` - totals source and transport decorators
//! - `wiring/` - filing pipeline and poll scheduler
//! - `handlers/` - bus consumers (confirmation, metrics)
//! - `runtime` - task startup and graceful shutdown

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod ports;
pub mod runtime;
pub mod wiring;

pub use container::{ConfigError, ContainerError, FilingConfig, FilingContainer};
pub use ports::{FilingInput, TotalsError, TotalsSource};
pub use runtime::FilingRuntime;
pub use wiring::{FilingPipeline, FilingRequest, PipelineError, PollScheduler};
