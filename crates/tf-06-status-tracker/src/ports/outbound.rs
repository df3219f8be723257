//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::RepositoryError;
use chrono::{DateTime, Utc};
use shared_types::{AuditEntry, Declaration, DeclarationId, DeclarationStatus};

/// Declaration persistence.
///
/// `commit` writes the declaration and its audit entry as one unit: either
/// both are stored or neither is.
pub trait DeclarationRepository: Send + Sync {
    fn insert(&self, declaration: Declaration) -> Result<(), RepositoryError>;

    fn get(&self, id: DeclarationId) -> Result<Declaration, RepositoryError>;

    /// Store the new state of an existing declaration.
    ///
    /// Fails with `DuplicateConfirmationNumber` if another declaration
    /// already holds the same confirmation number.
    fn commit(
        &self,
        declaration: &Declaration,
        audit: Option<AuditEntry>,
    ) -> Result<(), RepositoryError>;

    /// Audit entries of one declaration, oldest first.
    fn audit_trail(&self, id: DeclarationId) -> Result<Vec<AuditEntry>, RepositoryError>;

    /// `submitted`/`processing` declarations, least recently updated first.
    fn awaiting_outcome(&self) -> Vec<DeclarationId>;

    /// `retry-pending` declarations whose retry time has passed, earliest first.
    fn due_retries(&self, now: DateTime<Utc>) -> Vec<DeclarationId>;

    fn find_by_confirmation_number(&self, number: &str) -> Option<Declaration>;

    fn list(&self, status: Option<DeclarationStatus>) -> Vec<Declaration>;
}

/// Time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
