//! # Adapters

pub mod memory;
pub mod rsa_verifier;

pub use memory::InMemoryConfirmationStore;
pub use rsa_verifier::RsaReceiptVerifier;
