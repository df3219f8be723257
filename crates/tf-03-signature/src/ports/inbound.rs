//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{SignedDocument, StrategyConfig, StrategyDescription};
use crate::domain::errors::SignatureError;
use async_trait::async_trait;
use shared_types::{DeclarationId, SignatureRecord, SignatureType};

/// Primary signature engine API.
#[async_trait]
pub trait SignatureEngineApi: Send + Sync {
    /// Description of the strategy registered for `signature_type`.
    fn describe(&self, signature_type: SignatureType) -> Option<StrategyDescription>;

    /// Sign `document` and embed the signature.
    ///
    /// Any signature already embedded is replaced. A `SignatureRecord` is
    /// appended for every successful signing.
    async fn sign(
        &self,
        document: &str,
        declaration_id: DeclarationId,
        config: &StrategyConfig,
    ) -> Result<SignedDocument, SignatureError>;

    /// Every signature record of a declaration, oldest first.
    fn records(&self, declaration_id: DeclarationId) -> Vec<SignatureRecord>;
}
