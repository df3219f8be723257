//! # Signature Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{SignatureRecord, SignatureType, SignatureValidationStatus};

/// Algorithm label for local-certificate signatures.
pub const RSA_SHA256: &str = "RSA-SHA256";

/// Metadata extracted from an X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// Lowercase hex of the DER serial number.
    pub serial: String,
    /// Issuer distinguished name, e.g. `CN=Qualified CA`.
    pub issuer: String,
    /// Issuer common name when present.
    pub issuer_cn: Option<String>,
    pub subject: String,
    pub subject_cn: Option<String>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    /// Inclusive on both ends.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    /// Common name if present, otherwise the full subject.
    pub fn signer_name(&self) -> &str {
        self.subject_cn.as_deref().unwrap_or(&self.subject)
    }
}

/// Which strategy to use and on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub signature_type: SignatureType,
    /// Account reference at the identity provider. Required for
    /// trusted-identity signing, ignored otherwise.
    pub signer_reference: Option<String>,
}

impl StrategyConfig {
    pub fn new(signature_type: SignatureType) -> Self {
        Self {
            signature_type,
            signer_reference: None,
        }
    }

    pub fn trusted_identity(reference: impl Into<String>) -> Self {
        Self {
            signature_type: SignatureType::TrustedIdentity,
            signer_reference: Some(reference.into()),
        }
    }
}

/// Static description of a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyDescription {
    pub signature_type: SignatureType,
    pub algorithm: &'static str,
    /// Whether a private key is held locally.
    pub holds_private_key: bool,
    pub summary: &'static str,
}

/// What a strategy produced for one canonical document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutput {
    /// Base64 signature value; `None` for unsigned submissions.
    pub signature_value: Option<String>,
    pub signer: String,
    pub algorithm: String,
    pub certificate_info: Option<CertificateInfo>,
    /// Base64 DER certificate to embed, if any.
    pub certificate_der: Option<String>,
    /// External reference returned by an identity provider.
    pub provider_reference: Option<String>,
    pub validation_status: SignatureValidationStatus,
}

/// A document with its signature embedded, and the record of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDocument {
    pub content: String,
    pub signature_id: String,
    pub signature_type: SignatureType,
    pub certificate_info: Option<CertificateInfo>,
    pub record: SignatureRecord,
}
