//! # Outbound Ports (Driven Ports / SPI)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{DeclarationId, SignatureRecord};
use thiserror::Error;

/// Error from the external identity service.
#[derive(Debug, Error)]
pub enum IdentityProviderError {
    /// The account reference is unknown or not authorised to sign
    #[error("Signer rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered garbage
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// What is sent to the identity provider. The content itself never leaves
/// the process, only its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySigningRequest {
    pub signer_reference: String,
    /// Hex SHA-256 of the canonical document.
    pub content_hash: String,
    pub declaration_id: DeclarationId,
}

/// The provider's attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySignature {
    /// Base64 signature value issued by the provider.
    pub signature_value: String,
    /// Display name of the authenticated signer.
    pub signer: String,
    pub algorithm: String,
    /// Provider transaction reference.
    pub transaction_id: String,
}

/// Trusted-identity signing service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_digest(
        &self,
        request: &IdentitySigningRequest,
    ) -> Result<IdentitySignature, IdentityProviderError>;
}

/// Append-only store of signature records.
pub trait SignatureRecordStore: Send + Sync {
    fn append(&self, record: SignatureRecord);

    /// Records of one declaration in insertion order.
    fn for_declaration(&self, declaration_id: DeclarationId) -> Vec<SignatureRecord>;
}
