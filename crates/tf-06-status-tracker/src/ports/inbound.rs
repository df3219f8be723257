//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::TrackerResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{
    AuditEntry, Declaration, DeclarationId, DeclarationType, ReportingPeriod, SignatureType,
    Variant,
};

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Declarations looked at.
    pub examined: usize,
    /// Status polls sent.
    pub polled: usize,
    /// Retry-pending declarations without a confirmation number sent again.
    pub resubmitted: usize,
    /// Skipped because another action held the lock.
    pub skipped_locked: usize,
    /// Tracker errors (not transport failures, which are committed as
    /// status changes).
    pub errors: usize,
}

/// Lifecycle operations. Transport failures during `submit` and `poll` are
/// classified and committed as status changes; the returned declaration
/// carries the outcome and, on failure, `last_error`.
#[async_trait]
pub trait StatusTrackerApi: Send + Sync {
    /// New declaration in `draft`.
    async fn create(
        &self,
        declaration_type: DeclarationType,
        period: ReportingPeriod,
        variant: Variant,
    ) -> TrackerResult<Declaration>;

    /// Store a rendered document on a `draft` declaration.
    async fn attach_document(&self, id: DeclarationId, content: String) -> TrackerResult<Declaration>;

    /// `draft → ready` once validation has passed.
    async fn mark_ready(&self, id: DeclarationId, reason: &str) -> TrackerResult<Declaration>;

    /// Store the signed document of a `ready` declaration.
    async fn attach_signed_document(
        &self,
        id: DeclarationId,
        content: String,
        signature_type: SignatureType,
    ) -> TrackerResult<Declaration>;

    /// `ready → draft`, dropping the document and its signature.
    async fn reopen(&self, id: DeclarationId, reason: &str) -> TrackerResult<Declaration>;

    /// Send the signed document to the authority.
    async fn submit(&self, id: DeclarationId) -> TrackerResult<Declaration>;

    /// Ask the authority for the processing status now.
    async fn poll(&self, id: DeclarationId) -> TrackerResult<Declaration>;

    /// Operator action: `failed → ready`, clearing retry state.
    async fn reset_failed(&self, id: DeclarationId, reason: &str) -> TrackerResult<Declaration>;

    /// Poll awaiting declarations and run due retries.
    async fn sweep(&self, now: DateTime<Utc>) -> SweepReport;

    async fn history(&self, id: DeclarationId) -> TrackerResult<Vec<AuditEntry>>;

    async fn get(&self, id: DeclarationId) -> TrackerResult<Declaration>;
}
