//! # Core Domain Entities
//!
//! Defines the records the filing pipeline persists.
//!
//! ## Clusters
//!
//! - **Declaration**: `Declaration`, `DeclarationId`, `FailureContext`
//! - **Signatures**: `SignatureRecord`
//! - **Outcome**: `Confirmation`
//! - **Audit**: `AuditEntry`, `TransitionTrigger`

use crate::errors::DomainError;
use crate::period::ReportingPeriod;
use crate::status::{
    DeclarationStatus, DeclarationType, FormCode, SignatureType, SignatureValidationStatus,
    Variant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: THE DECLARATION
// =============================================================================

/// Unique identifier of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationId(pub Uuid);

impl DeclarationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeclarationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The failure that last moved a declaration to `retry-pending` or `failed`.
///
/// Retained for manual review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Error category as classified (e.g. `timeout`).
    pub category: String,
    /// Human-readable error message.
    pub message: String,
    /// Whether the category allowed a retry.
    pub retryable: bool,
    /// When the failure was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// A periodic tax filing.
///
/// The rendered document is private: once a signature has been embedded it
/// can only be replaced after [`Declaration::reopen`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub id: DeclarationId,
    pub declaration_type: DeclarationType,
    pub period: ReportingPeriod,
    pub variant: Variant,
    pub status: DeclarationStatus,
    document: Option<String>,
    signature_type: Option<SignatureType>,
    pub confirmation_number: Option<String>,
    pub confirmation_date: Option<DateTime<Utc>>,
    /// Consecutive retryable failures. Cleared by a successful exchange with
    /// the authority or an operator reset.
    pub retry_count: u32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub last_error: Option<FailureContext>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Declaration {
    /// A new declaration in `draft`.
    pub fn new(
        declaration_type: DeclarationType,
        period: ReportingPeriod,
        variant: Variant,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DeclarationId::new(),
            declaration_type,
            period,
            variant,
            status: DeclarationStatus::Draft,
            document: None,
            signature_type: None,
            confirmation_number: None,
            confirmation_date: None,
            retry_count: 0,
            next_retry_at: None,
            last_error: None,
            created_at: now,
            submitted_at: None,
            updated_at: now,
        }
    }

    pub fn form_code(&self) -> FormCode {
        self.declaration_type.form_code(self.variant)
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn signature_type(&self) -> Option<SignatureType> {
        self.signature_type
    }

    /// A signature has been embedded into the document.
    pub fn is_signed(&self) -> bool {
        self.signature_type.is_some()
    }

    /// Replace the rendered (unsigned) document.
    pub fn attach_document(&mut self, content: String) -> Result<(), DomainError> {
        if self.is_signed() {
            return Err(DomainError::DocumentFrozen);
        }
        self.document = Some(content);
        Ok(())
    }

    /// Store the signed document. Re-signing replaces the previous content.
    pub fn embed_signed_document(&mut self, content: String, signature_type: SignatureType) {
        self.document = Some(content);
        self.signature_type = Some(signature_type);
    }

    /// Unfreeze for re-rendering: the document and the signature are dropped.
    pub fn reopen(&mut self) {
        self.document = None;
        self.signature_type = None;
    }

    /// Clear retry bookkeeping after an operator reset.
    pub fn clear_retry_state(&mut self) {
        self.retry_count = 0;
        self.next_retry_at = None;
    }
}

// =============================================================================
// CLUSTER B: SIGNATURES
// =============================================================================

/// One signing of one declaration document. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub declaration_id: DeclarationId,
    pub signature_id: String,
    pub signature_type: SignatureType,
    /// Base64 signature value; `None` for the unsigned placeholder.
    pub signature_value: Option<String>,
    /// Certificate subject or identity-provider signer name.
    pub signer: String,
    pub algorithm: String,
    /// Hex SHA-256 of the canonical signed content.
    pub content_hash: String,
    pub validation_status: SignatureValidationStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CLUSTER C: OUTCOME
// =============================================================================

/// The authority's official receipt for an accepted declaration.
///
/// Stored once and never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub confirmation_number: String,
    pub confirmation_date: DateTime<Utc>,
    pub taxpayer_id: String,
    pub tax_office_code: String,
    pub form_code: FormCode,
    /// Period as written on the receipt.
    pub period: String,
    pub status_code: u16,
    pub raw_document: String,
    pub signature: Option<String>,
    pub declaration_id: Option<DeclarationId>,
    pub stored_at: DateTime<Utc>,
}

// =============================================================================
// CLUSTER D: AUDIT
// =============================================================================

/// What caused a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionTrigger {
    Caller,
    Sweep,
    Transport,
    Operator,
}

impl TransitionTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caller => "caller",
            Self::Sweep => "sweep",
            Self::Transport => "transport",
            Self::Operator => "operator",
        }
    }
}

/// Immutable record of one status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub declaration_id: DeclarationId,
    pub from: DeclarationStatus,
    pub to: DeclarationStatus,
    pub reason: String,
    pub trigger: TransitionTrigger,
    pub at: DateTime<Utc>,
}
