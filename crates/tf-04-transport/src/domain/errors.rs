//! # Transport Errors

use std::time::Duration;
use thiserror::Error;

/// Failure of one call to the authority. The client never retries; the
/// error classifier decides what happens next.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No response within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection could not be established or was dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status without a SOAP fault body
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: u16,
        body: String,
        /// Delay requested by the server via `Retry-After`.
        retry_after: Option<Duration>,
    },

    /// The service answered with a SOAP fault
    #[error("SOAP fault {code}: {reason}")]
    SoapFault { code: String, reason: String },

    /// Response body was not the expected SOAP message
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Credentials were refused before a request could be made
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The envelope or its security header could not be built
    #[error("Envelope construction failed: {0}")]
    Envelope(String),
}

impl TransportError {
    /// Server-requested delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
