//! # Signature Engine Service
//!
//! Selects a strategy, signs the canonical content, embeds the fragment and
//! appends a `SignatureRecord`.

use crate::domain::canonical::{build_fragment, content_hash, strip_signature};
use crate::domain::entities::{SignedDocument, StrategyConfig, StrategyDescription};
use crate::domain::errors::SignatureError;
use crate::ports::inbound::SignatureEngineApi;
use crate::ports::outbound::SignatureRecordStore;
use crate::strategies::{SignatureStrategy, SigningInput};
use async_trait::async_trait;
use chrono::Utc;
use shared_types::{DeclarationId, SignatureRecord, SignatureType};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Signature engine with registered strategies.
pub struct SignatureEngine {
    strategies: HashMap<SignatureType, Arc<dyn SignatureStrategy>>,
    records: Arc<dyn SignatureRecordStore>,
    production: bool,
}

impl SignatureEngine {
    pub fn new(records: Arc<dyn SignatureRecordStore>, production: bool) -> Self {
        Self {
            strategies: HashMap::new(),
            records,
            production,
        }
    }

    /// Register a strategy under the type it describes. Replaces any previous one.
    pub fn with_strategy(mut self, strategy: Arc<dyn SignatureStrategy>) -> Self {
        let signature_type = strategy.describe().signature_type;
        self.strategies.insert(signature_type, strategy);
        self
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    fn strategy(&self, signature_type: SignatureType) -> Result<&Arc<dyn SignatureStrategy>, SignatureError> {
        if signature_type == SignatureType::None && self.production {
            return Err(SignatureError::UnsignedInProduction);
        }
        self.strategies
            .get(&signature_type)
            .ok_or(SignatureError::UnsupportedStrategy(signature_type))
    }
}

#[async_trait]
impl SignatureEngineApi for SignatureEngine {
    fn describe(&self, signature_type: SignatureType) -> Option<StrategyDescription> {
        self.strategies.get(&signature_type).map(|s| s.describe())
    }

    async fn sign(
        &self,
        document: &str,
        declaration_id: DeclarationId,
        config: &StrategyConfig,
    ) -> Result<SignedDocument, SignatureError> {
        let strategy = match self.strategy(config.signature_type) {
            Ok(strategy) => strategy,
            Err(e) => {
                warn!(%declaration_id, signature_type = %config.signature_type, error = %e, "Signing refused");
                return Err(e);
            }
        };

        let canonical = strip_signature(document);
        let hash = content_hash(&canonical);
        let now = Utc::now();

        let output = strategy
            .sign(SigningInput {
                canonical: &canonical,
                content_hash: &hash,
                declaration_id,
                config,
                now,
            })
            .await?;

        let signature_id = format!("sig-{}", Uuid::new_v4());
        let fragment = build_fragment(&signature_id, config.signature_type, &hash, &output, now);
        let content = strategy.embed(&canonical, &fragment)?;

        let record = SignatureRecord {
            declaration_id,
            signature_id: signature_id.clone(),
            signature_type: config.signature_type,
            signature_value: output.signature_value.clone(),
            signer: output.signer.clone(),
            algorithm: output.algorithm.clone(),
            content_hash: hash,
            validation_status: output.validation_status,
            created_at: now,
        };
        self.records.append(record.clone());

        info!(
            %declaration_id,
            %signature_id,
            signature_type = %config.signature_type,
            signer = %record.signer,
            "Document signed"
        );

        Ok(SignedDocument {
            content,
            signature_id,
            signature_type: config.signature_type,
            certificate_info: output.certificate_info,
            record,
        })
    }

    fn records(&self, declaration_id: DeclarationId) -> Vec<SignatureRecord> {
        self.records.for_declaration(declaration_id)
    }
}
