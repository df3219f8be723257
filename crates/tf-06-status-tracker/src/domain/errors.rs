//! # Tracker Errors

use shared_types::{DeclarationId, DeclarationStatus, DomainError};
use thiserror::Error;

/// Failures of the declaration repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Declaration {0} not found")]
    NotFound(DeclarationId),

    #[error("Declaration {0} already exists")]
    AlreadyExists(DeclarationId),

    /// Confirmation numbers are unique across declarations.
    #[error("Confirmation number {number} is already held by declaration {holder}")]
    DuplicateConfirmationNumber {
        number: String,
        holder: DeclarationId,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// The lifecycle does not allow `event` in status `from`.
    #[error("Transition {event} is not allowed from {from}")]
    ForbiddenTransition {
        from: DeclarationStatus,
        event: &'static str,
    },

    /// Another action holds the declaration lock.
    #[error("Declaration {0} is already being processed")]
    AlreadyInProgress(DeclarationId),

    /// Submission requires a signed document.
    #[error("Declaration {0} has no signed document")]
    NotSigned(DeclarationId),

    /// Polling requires a confirmation number from an earlier submission.
    #[error("Declaration {0} has no confirmation number")]
    NoConfirmationNumber(DeclarationId),

    #[error(transparent)]
    Document(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
