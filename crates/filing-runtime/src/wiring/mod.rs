//! # Wiring
//!
//! Flows that span several components.
//!
//! ```text
//! TotalsSource → Renderer → Validator → Signature Engine → Status Tracker
//!                                                              │ submit
//!                                                              ↓
//!                  PollScheduler ──sweep──→ Status Tracker ──→ Transport
//!                                                              │
//!                                               OutcomeAccepted ↓
//!                                                       ConfirmationHandler
//! ```

pub mod pipeline;
pub mod scheduler;

pub use pipeline::{FilingPipeline, FilingRequest, PipelineError};
pub use scheduler::PollScheduler;
