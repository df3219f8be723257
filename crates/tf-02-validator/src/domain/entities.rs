//! # Validation Entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default tolerance for the amount-due reconciliation.
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Default plausibility window around "now" for document dates.
pub const DEFAULT_DATE_WINDOW_DAYS: i64 = 30;

/// `error` blocks signing and submission; `warning` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The pass that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPass {
    Structural,
    Schema,
    BusinessRule,
}

impl ValidationPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Schema => "schema",
            Self::BusinessRule => "business-rule",
        }
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub pass: ValidationPass,
    /// Stable machine-readable code, e.g. `amount-due-mismatch`.
    pub code: &'static str,
    /// Element path, e.g. `/VatReturn/DeclarationFields/AmountDue`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}: {}", self.pass.as_str(), self.code, self.path, self.message)
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(
        &mut self,
        pass: ValidationPass,
        code: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.is_valid = false;
        self.errors.push(ValidationIssue {
            severity: Severity::Error,
            pass,
            code,
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn warning(
        &mut self,
        pass: ValidationPass,
        code: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.warnings.push(ValidationIssue {
            severity: Severity::Warning,
            pass,
            code,
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|issue| issue.code == code)
    }

    /// Error messages, one line each.
    pub fn error_summary(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Tunable thresholds. Immutable once the validator is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    pub epsilon: f64,
    pub date_window_days: i64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            date_window_days: DEFAULT_DATE_WINDOW_DAYS,
        }
    }
}
