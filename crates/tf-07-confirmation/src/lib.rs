//! # Confirmation Validator (TF-07)
//!
//! Parses the authority's receipt for an accepted declaration, checks it
//! against the declaration it belongs to and stores it once.
//!
//! Hard errors (bad number, unsupported or mismatched form code, bad ids,
//! unparseable date, invalid signature) keep the receipt out of the store.
//! Soft findings (date far from now, period mismatch, status other than
//! 200, unsigned receipt, number already on file) are warnings.
//!
//! Storage is idempotent: the same confirmation number is written once.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{InMemoryConfirmationStore, RsaReceiptVerifier};
pub use domain::entities::{
    ConfirmationIssue, ConfirmationOutcome, ConfirmationPolicy, ConfirmationReport,
    ExpectedDeclaration, ParsedReceipt, Severity, CONFIRMATION_NUMBER_LEN,
    DEFAULT_DATE_WINDOW_DAYS,
};
pub use domain::errors::ConfirmationError;
pub use domain::parse::parse_receipt;
pub use domain::rules::{check_receipt, is_valid_confirmation_number, ACCEPTED_STATUS};
pub use ports::inbound::ConfirmationValidatorApi;
pub use ports::outbound::{ConfirmationStore, InsertOutcome, ReceiptSignatureVerifier};
pub use service::ConfirmationValidator;
