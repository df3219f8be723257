//! # Confirmation Errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfirmationError {
    /// Not well-formed XML, or not a receipt
    #[error("Malformed receipt: {0}")]
    Malformed(String),

    /// A required element is absent
    #[error("Receipt is missing {0}")]
    MissingElement(&'static str),

    /// The verification key could not be loaded
    #[error("Verification key: {0}")]
    VerificationKey(String),

    /// The confirmation store refused the write
    #[error("Confirmation store: {0}")]
    Store(String),
}
