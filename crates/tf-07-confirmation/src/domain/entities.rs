//! # Confirmation Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{DeclarationId, FormCode, ReportingPeriod};
use std::fmt;

/// Default plausibility window for the confirmation date.
pub const DEFAULT_DATE_WINDOW_DAYS: i64 = 30;

/// Length of an authority confirmation number.
pub const CONFIRMATION_NUMBER_LEN: usize = 32;

/// Receipt fields as read from the document. Text is kept verbatim; typing
/// happens in the rule checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReceipt {
    pub form_code: String,
    pub tax_office_code: String,
    pub period: String,
    pub taxpayer_id: String,
    pub confirmation_number: String,
    pub confirmation_date: String,
    pub status_code: String,
    /// Base64 signature value, when the receipt carries one.
    pub signature: Option<String>,
    /// The receipt with its `Signature` element cut out; this is what the
    /// authority signed.
    pub signed_content: String,
    pub raw: String,
}

/// What the receipt is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDeclaration {
    pub declaration_id: DeclarationId,
    pub form_code: FormCode,
    pub period: ReportingPeriod,
    /// Number issued at submission, if known.
    pub confirmation_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationIssue {
    pub severity: Severity,
    /// Stable code, e.g. `form-code-mismatch`.
    pub code: &'static str,
    /// Receipt element the issue is about.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfirmationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmationReport {
    pub errors: Vec<ConfirmationIssue>,
    pub warnings: Vec<ConfirmationIssue>,
}

impl ConfirmationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, code: &'static str, field: &'static str, message: impl Into<String>) {
        self.errors.push(ConfirmationIssue {
            severity: Severity::Error,
            code,
            field,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, code: &'static str, field: &'static str, message: impl Into<String>) {
        self.warnings.push(ConfirmationIssue {
            severity: Severity::Warning,
            code,
            field,
            message: message.into(),
        });
    }

    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|i| i.code == code)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|i| i.code == code)
    }

    pub fn error_summary(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub date_window_days: i64,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            date_window_days: DEFAULT_DATE_WINDOW_DAYS,
        }
    }
}

/// Result of `validate_and_store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationOutcome {
    pub report: ConfirmationReport,
    /// The record on file for this number, when the receipt was valid.
    pub stored: Option<shared_types::Confirmation>,
    /// The number was already on file; nothing new was written.
    pub duplicate: bool,
    pub checked_at: DateTime<Utc>,
}
