//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{StatusReport, SubmissionReceipt};
use crate::domain::errors::TransportError;
use async_trait::async_trait;

/// Calls to the authority's filing service. One request per call; no retries.
#[async_trait]
pub trait FilingTransport: Send + Sync {
    /// Submit a signed declaration document.
    async fn submit(&self, signed_document: &str) -> Result<SubmissionReceipt, TransportError>;

    /// Current processing status of an earlier submission.
    async fn check_status(&self, confirmation_number: &str) -> Result<StatusReport, TransportError>;

    /// Verify the endpoint is reachable and accepts our credentials.
    async fn probe_connectivity(&self) -> Result<(), TransportError>;
}
