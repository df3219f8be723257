//! Placeholder strategy for test and sandbox environments.

use super::{SignatureStrategy, SigningInput};
use crate::domain::entities::{StrategyDescription, StrategyOutput};
use crate::domain::errors::SignatureError;
use async_trait::async_trait;
use shared_types::{SignatureType, SignatureValidationStatus};

pub const UNSIGNED_SIGNER: &str = "unsigned";

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsignedStrategy;

#[async_trait]
impl SignatureStrategy for UnsignedStrategy {
    fn describe(&self) -> StrategyDescription {
        StrategyDescription {
            signature_type: SignatureType::None,
            algorithm: "none",
            holds_private_key: false,
            summary: "Embeds an UNSIGNED marker; refused in production",
        }
    }

    async fn sign(&self, _input: SigningInput<'_>) -> Result<StrategyOutput, SignatureError> {
        Ok(StrategyOutput {
            signature_value: None,
            signer: UNSIGNED_SIGNER.to_string(),
            algorithm: "none".to_string(),
            certificate_info: None,
            certificate_der: None,
            provider_reference: None,
            validation_status: SignatureValidationStatus::Pending,
        })
    }
}
