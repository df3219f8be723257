//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::ConfirmationError;
use shared_types::Confirmation;

/// Whether `insert_if_absent` wrote a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// Confirmations on file, keyed by confirmation number. Records are never
/// updated in place.
pub trait ConfirmationStore: Send + Sync {
    /// Store `confirmation` unless its number is already on file.
    fn insert_if_absent(&self, confirmation: Confirmation) -> Result<InsertOutcome, ConfirmationError>;

    fn get(&self, confirmation_number: &str) -> Option<Confirmation>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Checks the authority's signature over a receipt.
pub trait ReceiptSignatureVerifier: Send + Sync {
    /// `signed_content` is the receipt with its `Signature` element removed;
    /// `signature` is the base64 value of that element.
    fn verify(&self, signed_content: &str, signature: &str) -> bool;
}
