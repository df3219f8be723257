//! # Adapters Layer
//!
//! - `identity_http`: HTTP client for the trusted identity service
//! - `record_store`: In-memory signature record store

pub mod identity_http;
pub mod record_store;

pub use identity_http::HttpIdentityProvider;
pub use record_store::InMemorySignatureRecordStore;
