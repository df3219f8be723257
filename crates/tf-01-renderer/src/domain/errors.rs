//! Error types for the renderer.

use shared_types::{DeclarationType, Variant};
use thiserror::Error;

/// Which itemised ledger a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Sales,
    Purchase,
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sales => f.write_str("sales"),
            Self::Purchase => f.write_str("purchase"),
        }
    }
}

/// Rendering failures. All of them are input errors the caller must fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A mandatory identity field is missing or blank.
    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Taxpayer id must be 10 or 11 digits, got {0:?}")]
    InvalidTaxpayerId(String),

    #[error("Tax-office code must be exactly 4 digits, got {0:?}")]
    InvalidTaxOfficeCode(String),

    /// The reporting period is monthly but the variant is quarterly, or vice versa.
    #[error("Period {period} does not match the {variant} variant")]
    PeriodVariantMismatch { period: String, variant: Variant },

    #[error("{0} declarations have no itemised ledger")]
    LedgerNotSupported(DeclarationType),

    /// A ledger row is missing a mandatory value. `row` is 1-based.
    #[error("{ledger} ledger row {row}: {reason}")]
    InvalidLedgerRow {
        ledger: LedgerKind,
        row: usize,
        reason: &'static str,
    },
}
