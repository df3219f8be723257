//! RSA-SHA256 receipt signature check against the authority's public key.

use crate::domain::errors::ConfirmationError;
use crate::ports::outbound::ReceiptSignatureVerifier;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::Sha256;

#[derive(Debug, Clone)]
pub struct RsaReceiptVerifier {
    key: VerifyingKey<Sha256>,
}

impl RsaReceiptVerifier {
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self {
            key: VerifyingKey::new(public_key),
        }
    }

    /// SubjectPublicKeyInfo (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, ConfirmationError> {
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map(Self::new)
            .map_err(|e| ConfirmationError::VerificationKey(e.to_string()))
    }
}

impl ReceiptSignatureVerifier for RsaReceiptVerifier {
    fn verify(&self, signed_content: &str, signature: &str) -> bool {
        let Ok(bytes) = BASE64.decode(signature.as_bytes()) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(bytes.as_slice()) else {
            return false;
        };
        self.key.verify(signed_content.as_bytes(), &signature).is_ok()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::signature::{SignatureEncoding, Signer};
    use rsa::RsaPrivateKey;
    use sha2::Sha256;

    pub const AUTHORITY_KEY_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/authority_key.pem"));
    pub const AUTHORITY_PUB_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/authority_pub.pem"));
    pub const STRANGER_KEY_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/stranger_key.pem"));

    /// Base64 RSA-SHA256 signature of `content` with a PKCS#8 key.
    pub fn sign(key_pem: &str, content: &str) -> String {
        let key = RsaPrivateKey::from_pkcs8_pem(key_pem).unwrap();
        let signature = SigningKey::<Sha256>::new(key).sign(content.as_bytes());
        BASE64.encode(signature.to_bytes())
    }
}
