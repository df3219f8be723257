//! # Inbound Ports

use crate::domain::category::ErrorCategory;
use crate::domain::classify::Classification;
use crate::domain::policy::{RetryDecision, RetryPolicy};
use chrono::{DateTime, Utc};
use tf_04_transport::TransportError;

/// Classification and retry scheduling, as used by the status tracker.
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, error: &TransportError) -> Classification;

    /// Failures that only exist as text (adapter logs, operator notes).
    fn classify_message(&self, message: &str) -> ErrorCategory;

    /// Next step for a classified failure of a declaration that has already
    /// been retried `retries_so_far` times.
    fn decide(
        &self,
        classification: &Classification,
        retries_so_far: u32,
        now: DateTime<Utc>,
    ) -> RetryDecision;

    fn policy(&self) -> &RetryPolicy;
}
