//! # Transport Client (TF-04)
//!
//! SOAP-style request/response with the authority's filing service over
//! HTTPS. Every envelope carries a WS-Security header: a five-minute
//! timestamp, the client certificate as a binary security token, and an
//! XMLDSig signature over the body.
//!
//! ## Operations
//!
//! - `submit`: send a signed declaration, get a confirmation number
//! - `check_status`: poll processing status, receive the receipt once accepted
//! - `probe_connectivity`: endpoint and credential check
//!
//! ## Status codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 300 | submitted |
//! | 301-399 | processing |
//! | 200 | accepted |
//! | 400-499 | rejected |
//! | other | error |
//!
//! Failures surface as `TransportError`. The client never retries.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::HttpSoapChannel;
pub use domain::entities::{
    StatusReport, SubmissionReceipt, TransportConfig, TransportCredentials, TransportStatus,
    DEFAULT_TIMEOUT, TIMESTAMP_VALIDITY,
};
pub use domain::errors::TransportError;
pub use domain::response::parse_instant;
pub use ports::inbound::FilingTransport;
pub use ports::outbound::{RawResponse, SoapChannel};
pub use service::SoapTransportClient;
