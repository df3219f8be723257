//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::ValidationReport;
use chrono::{DateTime, Utc};
use shared_types::Variant;

/// Primary validator API.
///
/// Validation never fails as a call: every problem is a report entry.
pub trait DocumentValidator: Send + Sync {
    /// Validate against the wall clock.
    fn validate(&self, document: &str, variant: Variant) -> ValidationReport {
        self.validate_at(document, variant, Utc::now())
    }

    /// Validate with date checks judged against `now`.
    fn validate_at(&self, document: &str, variant: Variant, now: DateTime<Utc>)
        -> ValidationReport;
}
