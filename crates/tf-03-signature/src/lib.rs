//! # Signature Engine (TF-03)
//!
//! Attaches a digital signature to a validated declaration document.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Canonical content, fragment embedding,
//!   certificate parsing, trust policy
//! - **Strategies** (`strategies/`): trusted identity, local certificate, unsigned
//! - **Ports Layer** (`ports/`): `SignatureEngineApi` inbound, identity
//!   provider and record store outbound
//! - **Adapters** (`adapters/`): HTTP identity client, in-memory record store
//! - **Service Layer** (`service.rs`): `SignatureEngine`
//!
//! ## Rules
//!
//! - The signed bytes are the document without any signature fragment.
//! - Re-signing replaces the fragment and appends a new record.
//! - Certificates are checked against the issuer allow-list, their validity
//!   window and the revocation list before every signing.
//! - The unsigned strategy is refused when the engine runs in production mode.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod strategies;

// Re-export public API
pub use adapters::{HttpIdentityProvider, InMemorySignatureRecordStore};
pub use domain::canonical::{content_hash, embedded_fragment, strip_signature};
pub use domain::certificate::{load_private_key, LoadedCertificate};
pub use domain::entities::{
    CertificateInfo, SignedDocument, StrategyConfig, StrategyDescription, StrategyOutput,
};
pub use domain::errors::SignatureError;
pub use domain::trust::TrustPolicy;
pub use ports::inbound::SignatureEngineApi;
pub use ports::outbound::{
    IdentityProvider, IdentityProviderError, IdentitySignature, IdentitySigningRequest,
    SignatureRecordStore,
};
pub use service::SignatureEngine;
pub use strategies::local_certificate::verify_signature;
pub use strategies::{
    LocalCertificateStrategy, SignatureStrategy, SigningInput, TrustedIdentityStrategy,
    UnsignedStrategy,
};
