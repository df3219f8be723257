//! # Declaration Validator (TF-02)
//!
//! Checks a rendered document in three passes before it may be signed:
//!
//! 1. **Structural**: XML declaration, UTF-8, well-formedness, known root
//!    element and namespace. A parse failure ends validation here.
//! 2. **Schema**: mandatory sections and fields for the schema and variant.
//! 3. **Business rules**: amount reconciliation, checksums, dates, periods
//!    and ledger control totals.
//!
//! Errors make the report invalid. Warnings never do.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::entities::{
    Severity, ValidationIssue, ValidationPass, ValidationPolicy, ValidationReport,
    DEFAULT_DATE_WINDOW_DAYS, DEFAULT_EPSILON,
};
pub use domain::validate::validate_document;
pub use ports::inbound::DocumentValidator;
pub use service::ValidatorService;
