//! Transport decorator recording call durations and submission outcomes.

use async_trait::async_trait;
use filing_telemetry::{metric_inc, metric_observe, SUBMISSIONS, TRANSPORT_DURATION};
use std::time::Instant;
use tf_04_transport::{FilingTransport, StatusReport, SubmissionReceipt, TransportError};

pub struct MeteredTransport<T> {
    inner: T,
}

impl<T: FilingTransport> MeteredTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: FilingTransport> FilingTransport for MeteredTransport<T> {
    async fn submit(&self, signed_document: &str) -> Result<SubmissionReceipt, TransportError> {
        let started = Instant::now();
        let result = self.inner.submit(signed_document).await;
        metric_observe!(TRANSPORT_DURATION, &["submit"], started.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "accepted" } else { "failed" };
        metric_inc!(SUBMISSIONS, &[outcome]);
        result
    }

    async fn check_status(&self, confirmation_number: &str) -> Result<StatusReport, TransportError> {
        let started = Instant::now();
        let result = self.inner.check_status(confirmation_number).await;
        metric_observe!(TRANSPORT_DURATION, &["check_status"], started.elapsed().as_secs_f64());
        result
    }

    async fn probe_connectivity(&self) -> Result<(), TransportError> {
        let started = Instant::now();
        let result = self.inner.probe_connectivity().await;
        metric_observe!(TRANSPORT_DURATION, &["probe"], started.elapsed().as_secs_f64());
        result
    }
}
