//! # Adapters
//!
//! - `totals`: `TotalsSource` implementations
//! - `metered`: metrics decorator around any `FilingTransport`

pub mod metered;
pub mod totals;

pub use metered::MeteredTransport;
pub use totals::{InMemoryTotalsSource, JsonTotalsSource};
