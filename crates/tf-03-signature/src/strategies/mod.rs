//! # Signing Strategies
//!
//! One contract, three implementations. The engine chooses a strategy by
//! `SignatureType` and never inspects its internals.

pub mod local_certificate;
pub mod trusted_identity;
pub mod unsigned;

use crate::domain::canonical;
use crate::domain::entities::{StrategyConfig, StrategyDescription, StrategyOutput};
use crate::domain::errors::SignatureError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::DeclarationId;

pub use local_certificate::LocalCertificateStrategy;
pub use trusted_identity::TrustedIdentityStrategy;
pub use unsigned::UnsignedStrategy;

/// Everything a strategy may look at when signing.
#[derive(Debug, Clone, Copy)]
pub struct SigningInput<'a> {
    /// Document with any previous signature removed.
    pub canonical: &'a str,
    /// Hex SHA-256 of `canonical`.
    pub content_hash: &'a str,
    pub declaration_id: DeclarationId,
    pub config: &'a StrategyConfig,
    pub now: DateTime<Utc>,
}

#[async_trait]
pub trait SignatureStrategy: Send + Sync {
    fn describe(&self) -> StrategyDescription;

    async fn sign(&self, input: SigningInput<'_>) -> Result<StrategyOutput, SignatureError>;

    /// Place the signature fragment into the document.
    fn embed(&self, document: &str, fragment: &str) -> Result<String, SignatureError> {
        canonical::embed(document, fragment)
    }
}
