//! # Error Classifier Service

use crate::domain::category::ErrorCategory;
use crate::domain::classify::{classify_message, classify_transport, Classification};
use crate::domain::policy::{RetryDecision, RetryPolicy};
use crate::ports::inbound::FailureClassifier;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tf_04_transport::TransportError;
use tracing::{debug, warn};

/// Stateless classifier over a shared, read-only retry policy.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    policy: Arc<RetryPolicy>,
}

impl ErrorClassifier {
    pub fn new(policy: Arc<RetryPolicy>) -> Self {
        Self { policy }
    }
}

impl FailureClassifier for ErrorClassifier {
    fn classify(&self, error: &TransportError) -> Classification {
        let classification = classify_transport(error);
        debug!(
            category = %classification.category,
            retryable = classification.is_retryable(),
            "Classified transport failure"
        );
        classification
    }

    fn classify_message(&self, message: &str) -> ErrorCategory {
        classify_message(message)
    }

    fn decide(
        &self,
        classification: &Classification,
        retries_so_far: u32,
        now: DateTime<Utc>,
    ) -> RetryDecision {
        let decision =
            self.policy
                .decide_with(classification, retries_so_far, now, &mut rand::thread_rng());
        match &decision {
            RetryDecision::Retry {
                attempt,
                next_retry_at,
                ..
            } => debug!(attempt, %next_retry_at, category = %classification.category, "Retry scheduled"),
            RetryDecision::Exhausted { attempts } => warn!(
                attempts,
                category = %classification.category,
                "Retry budget exhausted"
            ),
            RetryDecision::Terminal => warn!(
                category = %classification.category,
                "Non-retryable failure"
            ),
        }
        decision
    }

    fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_classify_and_decide() {
        let classifier = ErrorClassifier::new(Arc::new(RetryPolicy::default()));
        let now = Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap();

        let c = classifier.classify(&TransportError::HttpStatus {
            status: 503,
            body: String::new(),
            retry_after: None,
        });
        assert_eq!(c.category, ErrorCategory::ServiceUnavailable);

        match classifier.decide(&c, 0, now) {
            RetryDecision::Retry { next_retry_at, delay, .. } => {
                assert!(delay >= Duration::from_secs(5));
                assert!(delay <= Duration::from_millis(5_500));
                assert!(next_retry_at > now);
            }
            other => panic!("unexpected {other:?}"),
        }

        let auth = classifier.classify(&TransportError::HttpStatus {
            status: 401,
            body: String::new(),
            retry_after: None,
        });
        assert_eq!(classifier.decide(&auth, 0, now), RetryDecision::Terminal);
    }

    #[test]
    fn test_policy_is_shared() {
        let policy = Arc::new(RetryPolicy {
            max_retries: 5,
            ..RetryPolicy::default()
        });
        let a = ErrorClassifier::new(policy.clone());
        let b = a.clone();
        assert_eq!(b.policy().max_retries, 5);
        assert_eq!(Arc::strong_count(&policy), 3);
    }
}
