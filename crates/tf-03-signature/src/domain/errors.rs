//! # Signature Errors

use shared_types::SignatureType;
use thiserror::Error;

/// Errors raised while preparing or applying a signature.
///
/// All of these occur before any network call to the authority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No strategy registered for the requested signature type
    #[error("No signing strategy registered for {0}")]
    UnsupportedStrategy(SignatureType),

    /// The unsigned strategy is disabled in production
    #[error("Unsigned submissions are not permitted in production")]
    UnsignedInProduction,

    /// The document has no closing root tag to anchor the signature
    #[error("Document cannot carry a signature: {0}")]
    InvalidDocument(&'static str),

    /// The private key could not be decoded
    #[error("Failed to load private key: {0}")]
    KeyLoad(String),

    /// The certificate could not be decoded
    #[error("Failed to parse certificate: {0}")]
    CertificateParse(String),

    /// The certificate public key is not RSA or does not match the private key
    #[error("Certificate public key does not match the signing key")]
    KeyCertificateMismatch,

    /// Issuer is not on the trusted allow-list
    #[error("Certificate issuer is not trusted: {0}")]
    UntrustedIssuer(String),

    /// Current time precedes the certificate validity window
    #[error("Certificate is not yet valid (valid from {0})")]
    CertificateNotYetValid(String),

    /// Current time is past the certificate validity window
    #[error("Certificate expired at {0}")]
    CertificateExpired(String),

    /// Serial number appears on the revocation list
    #[error("Certificate {0} has been revoked")]
    CertificateRevoked(String),

    /// The RSA operation failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// The fresh signature did not verify against the certificate
    #[error("Signature did not verify against the certificate public key")]
    SelfVerificationFailed,

    /// The identity provider rejected or failed the request
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    /// A trusted-identity signature requires a signer reference
    #[error("Missing signer reference for trusted-identity signing")]
    MissingSignerReference,
}
