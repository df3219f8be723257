//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::TransportError;
use async_trait::async_trait;
use std::time::Duration;

/// Raw HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed `Retry-After` header.
    pub retry_after: Option<Duration>,
    pub body: String,
}

/// Posts one SOAP envelope and returns whatever came back.
///
/// Implementations map connection problems to `Timeout`/`Network` and
/// return every HTTP answer, successful or not, as `RawResponse`.
#[async_trait]
pub trait SoapChannel: Send + Sync {
    async fn post(&self, action: &str, envelope: String) -> Result<RawResponse, TransportError>;
}
