//! Delegated signing through an external identity service. No private key
//! is held locally; only the content digest is sent out.

use super::{SignatureStrategy, SigningInput};
use crate::domain::entities::{StrategyDescription, StrategyOutput};
use crate::domain::errors::SignatureError;
use crate::ports::outbound::{IdentityProvider, IdentitySigningRequest};
use async_trait::async_trait;
use shared_types::{SignatureType, SignatureValidationStatus};
use std::sync::Arc;
use tracing::debug;

pub struct TrustedIdentityStrategy {
    provider: Arc<dyn IdentityProvider>,
}

impl TrustedIdentityStrategy {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SignatureStrategy for TrustedIdentityStrategy {
    fn describe(&self) -> StrategyDescription {
        StrategyDescription {
            signature_type: SignatureType::TrustedIdentity,
            algorithm: "provider-defined",
            holds_private_key: false,
            summary: "Signer authenticated by the trusted identity service",
        }
    }

    async fn sign(&self, input: SigningInput<'_>) -> Result<StrategyOutput, SignatureError> {
        let reference = input
            .config
            .signer_reference
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or(SignatureError::MissingSignerReference)?;

        let request = IdentitySigningRequest {
            signer_reference: reference.to_string(),
            content_hash: input.content_hash.to_string(),
            declaration_id: input.declaration_id,
        };
        let attestation = self
            .provider
            .sign_digest(&request)
            .await
            .map_err(|e| SignatureError::IdentityProvider(e.to_string()))?;

        debug!(
            declaration_id = %input.declaration_id,
            transaction_id = %attestation.transaction_id,
            "Identity provider signed digest"
        );

        Ok(StrategyOutput {
            signature_value: Some(attestation.signature_value),
            signer: attestation.signer,
            algorithm: attestation.algorithm,
            certificate_info: None,
            certificate_der: None,
            provider_reference: Some(attestation.transaction_id),
            // Only the provider can verify its own attestation.
            validation_status: SignatureValidationStatus::Pending,
        })
    }
}
