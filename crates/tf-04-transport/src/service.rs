//! # Transport Client Service
//!
//! Builds a signed envelope per call, posts it through the `SoapChannel` and
//! turns the answer into a receipt, a status report or a `TransportError`.

use crate::domain::entities::{StatusReport, SubmissionReceipt, TransportConfig, TransportCredentials};
use crate::domain::envelope::{build_request, SoapOperation};
use crate::domain::errors::TransportError;
use crate::domain::response::{parse_fault, parse_ping, parse_status, parse_submission};
use crate::ports::inbound::FilingTransport;
use crate::ports::outbound::{RawResponse, SoapChannel};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, warn};

/// Longest body excerpt kept in an `HttpStatus` error.
const BODY_EXCERPT: usize = 512;

pub struct SoapTransportClient<C: SoapChannel> {
    channel: C,
    credentials: TransportCredentials,
    config: TransportConfig,
}

impl<C: SoapChannel> SoapTransportClient<C> {
    pub fn new(channel: C, credentials: TransportCredentials, config: TransportConfig) -> Self {
        Self {
            channel,
            credentials,
            config,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn exchange(&self, operation: SoapOperation<'_>) -> Result<String, TransportError> {
        let request = build_request(
            &operation,
            &self.credentials,
            &self.config.soap_action_prefix,
            Utc::now(),
        )?;

        let started = Instant::now();
        let result = self.channel.post(&request.action, request.envelope).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(operation = request.operation, elapsed_ms, error = %e, "Transport call failed");
                return Err(e);
            }
        };
        debug!(
            operation = request.operation,
            status = response.status,
            elapsed_ms,
            "Authority responded"
        );
        into_body(response)
    }
}

/// Success bodies pass through. SOAP faults on HTTP 500 become `SoapFault`;
/// every other non-2xx answer is an `HttpStatus`.
fn into_body(response: RawResponse) -> Result<String, TransportError> {
    if (200..300).contains(&response.status) {
        return Ok(response.body);
    }
    if response.status == 500 {
        if let Some(fault) = parse_fault(&response.body) {
            return Err(fault);
        }
    }
    let mut body = response.body;
    if body.len() > BODY_EXCERPT {
        let mut cut = BODY_EXCERPT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(TransportError::HttpStatus {
        status: response.status,
        body,
        retry_after: response.retry_after,
    })
}

#[async_trait]
impl<C: SoapChannel> FilingTransport for SoapTransportClient<C> {
    async fn submit(&self, signed_document: &str) -> Result<SubmissionReceipt, TransportError> {
        let body = self
            .exchange(SoapOperation::SendDocument {
                document: signed_document,
            })
            .await?;
        parse_submission(&body)
    }

    async fn check_status(&self, confirmation_number: &str) -> Result<StatusReport, TransportError> {
        let body = self
            .exchange(SoapOperation::GetStatus {
                confirmation_number,
            })
            .await?;
        parse_status(&body, confirmation_number)
    }

    async fn probe_connectivity(&self) -> Result<(), TransportError> {
        let body = self.exchange(SoapOperation::Ping).await?;
        parse_ping(&body)
    }
}
