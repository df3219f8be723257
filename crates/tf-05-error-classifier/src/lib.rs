//! # Error Classifier (TF-05)
//!
//! Decides whether a failed submission or poll is worth retrying and when.
//!
//! ## Retryable categories
//!
//! `timeout`, `network`, `protocol-fault`, `service-unavailable` and
//! `temporary`. `authentication`, `validation` and `unknown` fail the
//! declaration immediately.
//!
//! ## Backoff
//!
//! `min(5s * 2^n, 300s)` plus up to 10% jitter, at most three retryable
//! failures per declaration. A server `Retry-After` replaces the computed
//! delay.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::category::ErrorCategory;
pub use domain::classify::{classify_message, classify_transport, Classification};
pub use domain::policy::{
    RetryDecision, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_JITTER_RATIO, DEFAULT_MAX_DELAY,
    DEFAULT_MAX_RETRIES,
};
pub use ports::inbound::FailureClassifier;
pub use service::ErrorClassifier;
