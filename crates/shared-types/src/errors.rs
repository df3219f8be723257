//! # Error Types
//!
//! Defines error types raised by the shared domain model.

use thiserror::Error;

/// Errors raised while constructing or mutating shared domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Month outside 1..=12.
    #[error("Invalid month: {0}")]
    InvalidMonth(u8),

    /// Quarter outside 1..=4.
    #[error("Invalid quarter: {0}")]
    InvalidQuarter(u8),

    /// Year outside the supported range.
    #[error("Invalid year: {0}")]
    InvalidYear(i32),

    /// Period string could not be parsed.
    #[error("Malformed reporting period: {0}")]
    MalformedPeriod(String),

    /// Form code not in the supported set.
    #[error("Unknown form code: {0}")]
    UnknownFormCode(String),

    /// Declaration type string not recognised.
    #[error("Unknown declaration type: {0}")]
    UnknownDeclarationType(String),

    /// Status string not recognised.
    #[error("Unknown declaration status: {0}")]
    UnknownStatus(String),

    /// Signature type string not recognised.
    #[error("Unknown signature type: {0}")]
    UnknownSignatureType(String),

    /// Document is signed and cannot be replaced.
    #[error("Document is frozen: a signature has been embedded; reopen the declaration to draft first")]
    DocumentFrozen,

    /// Operation requires a rendered document.
    #[error("Declaration has no rendered document")]
    NoDocument,
}
