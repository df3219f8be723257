//! # Transport Entities

use crate::domain::errors::TransportError;
use chrono::{DateTime, Utc};
use rsa::pkcs1v15::SigningKey;
use sha2::Sha256;
use shared_types::DeclarationStatus;
use std::fmt;
use std::time::Duration;
use tf_03_signature::{load_private_key, LoadedCertificate};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validity of the WS-Security timestamp.
pub const TIMESTAMP_VALIDITY: Duration = Duration::from_secs(5 * 60);

/// Outcome class of an authority status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportStatus {
    /// `300`: received, queued
    Submitted,
    /// `301..=399`: being processed
    Processing,
    /// `200`: accepted, receipt available
    Accepted,
    /// `400..=499`: rejected on content
    Rejected,
    /// Anything else
    Error,
}

impl TransportStatus {
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => Self::Accepted,
            300 => Self::Submitted,
            301..=399 => Self::Processing,
            400..=499 => Self::Rejected,
            _ => Self::Error,
        }
    }

    /// Lifecycle status this maps to; `None` for `Error`.
    pub fn declaration_status(&self) -> Option<DeclarationStatus> {
        match self {
            Self::Submitted => Some(DeclarationStatus::Submitted),
            Self::Processing => Some(DeclarationStatus::Processing),
            Self::Accepted => Some(DeclarationStatus::Accepted),
            Self::Rejected => Some(DeclarationStatus::Rejected),
            Self::Error => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub confirmation_number: String,
    pub confirmation_date: Option<DateTime<Utc>>,
    pub status: TransportStatus,
    pub status_code: u16,
    pub message: Option<String>,
}

/// Answer to a status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub confirmation_number: String,
    pub status: TransportStatus,
    pub status_code: u16,
    pub status_description: String,
    pub processing_date: Option<DateTime<Utc>>,
    /// Official receipt document, present once accepted.
    pub receipt: Option<String>,
}

/// Key and certificate used for the WS-Security header.
#[derive(Clone)]
pub struct TransportCredentials {
    signing_key: SigningKey<Sha256>,
    certificate_der: Vec<u8>,
}

impl fmt::Debug for TransportCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportCredentials")
            .field("certificate_der_len", &self.certificate_der.len())
            .finish_non_exhaustive()
    }
}

impl TransportCredentials {
    /// Key as PKCS#8/PKCS#1 PEM, certificate as PEM or DER. The key must
    /// belong to the certificate.
    pub fn from_pem(key_pem: &str, certificate: &[u8]) -> Result<Self, TransportError> {
        let key = load_private_key(key_pem).map_err(|e| TransportError::Authentication(e.to_string()))?;
        let cert = LoadedCertificate::from_bytes(certificate)
            .map_err(|e| TransportError::Authentication(e.to_string()))?;
        if key.to_public_key() != cert.public_key {
            return Err(TransportError::Authentication(
                "transport key does not match certificate".into(),
            ));
        }
        Ok(Self {
            signing_key: SigningKey::<Sha256>::new(key),
            certificate_der: cert.der,
        })
    }

    pub fn signing_key(&self) -> &SigningKey<Sha256> {
        &self.signing_key
    }

    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }
}

/// Endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// Prefix for the `SOAPAction` header, e.g. `urn:tax-authority:services:filing:1`.
    pub soap_action_prefix: String,
}

impl TransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            soap_action_prefix: crate::domain::envelope::SERVICE_NAMESPACE.to_string(),
        }
    }
}
