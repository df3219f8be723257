//! # Shared Types Crate
//!
//! This crate contains the declaration model used by every stage of the
//! filing pipeline: renderer, validator, signature engine, transport,
//! status tracker and confirmation validator.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-component types are defined here.
//! - **Frozen Documents**: Once a signature is embedded, the rendered document
//!   can only change by reopening the declaration to `draft`.
//! - **Exact Money**: Amounts are carried in integer minor units; conversion to
//!   whole units rounds half away from zero.

pub mod entities;
pub mod errors;
pub mod ids;
pub mod money;
pub mod period;
pub mod status;

pub use entities::*;
pub use errors::*;
pub use money::Money;
pub use period::{PeriodUnit, ReportingPeriod};
pub use status::*;
