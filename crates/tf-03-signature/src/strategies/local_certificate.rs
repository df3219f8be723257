//! Local RSA key + X.509 certificate.
//!
//! Signature value: RSA PKCS#1 v1.5 over SHA-256 of the canonical document,
//! base64 encoded. Each signature is verified against the certificate
//! public key before it is reported valid.

use super::{SignatureStrategy, SigningInput};
use crate::domain::certificate::{load_private_key, LoadedCertificate};
use crate::domain::entities::{CertificateInfo, StrategyDescription, StrategyOutput, RSA_SHA256};
use crate::domain::errors::SignatureError;
use crate::domain::trust::TrustPolicy;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use shared_types::{SignatureType, SignatureValidationStatus};
use std::fmt;
use tracing::warn;

pub struct LocalCertificateStrategy {
    signing_key: SigningKey<Sha256>,
    certificate: LoadedCertificate,
    trust: TrustPolicy,
}

impl fmt::Debug for LocalCertificateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCertificateStrategy")
            .field("certificate", &self.certificate.info)
            .field("trust", &self.trust)
            .finish_non_exhaustive()
    }
}

impl LocalCertificateStrategy {
    /// Fails if the certificate does not carry the public half of `private_key`.
    pub fn new(
        private_key: RsaPrivateKey,
        certificate: LoadedCertificate,
        trust: TrustPolicy,
    ) -> Result<Self, SignatureError> {
        if private_key.to_public_key() != certificate.public_key {
            return Err(SignatureError::KeyCertificateMismatch);
        }
        Ok(Self {
            signing_key: SigningKey::<Sha256>::new(private_key),
            certificate,
            trust,
        })
    }

    /// Key as PKCS#8/PKCS#1 PEM, certificate as PEM or DER.
    pub fn from_pem(
        key_pem: &str,
        certificate: &[u8],
        trust: TrustPolicy,
    ) -> Result<Self, SignatureError> {
        let key = load_private_key(key_pem)?;
        let certificate = LoadedCertificate::from_bytes(certificate)?;
        Self::new(key, certificate, trust)
    }

    pub fn certificate_info(&self) -> &CertificateInfo {
        &self.certificate.info
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.certificate.public_key
    }
}

/// RSA-SHA256 PKCS#1 v1.5 signature bytes.
pub fn rsa_sha256_sign(key: &SigningKey<Sha256>, content: &[u8]) -> Result<Vec<u8>, SignatureError> {
    key.try_sign(content)
        .map(|sig| sig.to_vec())
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))
}

/// Verify a base64 RSA-SHA256 signature over `content`.
pub fn verify_signature(public_key: &RsaPublicKey, content: &[u8], signature_b64: &str) -> bool {
    let Ok(bytes) = BASE64.decode(signature_b64.trim()) else {
        return false;
    };
    let Ok(signature) = Signature::try_from(bytes.as_slice()) else {
        return false;
    };
    VerifyingKey::<Sha256>::new(public_key.clone())
        .verify(content, &signature)
        .is_ok()
}

#[async_trait]
impl SignatureStrategy for LocalCertificateStrategy {
    fn describe(&self) -> StrategyDescription {
        StrategyDescription {
            signature_type: SignatureType::LocalCertificate,
            algorithm: RSA_SHA256,
            holds_private_key: true,
            summary: "RSA-SHA256 with a locally held key and X.509 certificate",
        }
    }

    async fn sign(&self, input: SigningInput<'_>) -> Result<StrategyOutput, SignatureError> {
        let info = &self.certificate.info;
        if let Err(e) = self.trust.check(info, input.now) {
            warn!(
                declaration_id = %input.declaration_id,
                serial = %info.serial,
                error = %e,
                "Certificate failed trust check"
            );
            return Err(e);
        }

        let raw = rsa_sha256_sign(&self.signing_key, input.canonical.as_bytes())?;
        let value = BASE64.encode(&raw);

        if !verify_signature(&self.certificate.public_key, input.canonical.as_bytes(), &value) {
            return Err(SignatureError::SelfVerificationFailed);
        }

        Ok(StrategyOutput {
            signature_value: Some(value),
            signer: info.signer_name().to_string(),
            algorithm: RSA_SHA256.to_string(),
            certificate_info: Some(info.clone()),
            certificate_der: Some(BASE64.encode(&self.certificate.der)),
            provider_reference: None,
            validation_status: SignatureValidationStatus::Valid,
        })
    }
}
