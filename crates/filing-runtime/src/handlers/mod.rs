//! # Event Handlers
//!
//! Bus consumers started by the runtime.

pub mod confirmation;
pub mod metrics;

pub use confirmation::ConfirmationHandler;
pub use metrics::MetricsHandler;
