//! `reqwest` SOAP channel.

use crate::domain::entities::TransportConfig;
use crate::domain::errors::TransportError;
use crate::ports::outbound::{RawResponse, SoapChannel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

pub struct HttpSoapChannel {
    client: Client,
    endpoint: String,
}

impl HttpSoapChannel {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("HTTP client init: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

/// `Retry-After` as delta-seconds or an HTTP date.
pub fn parse_retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    (at - now).to_std().ok().or(Some(Duration::ZERO))
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

#[async_trait]
impl SoapChannel for HttpSoapChannel {
    async fn post(&self, action: &str, envelope: String) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", format!("\"{action}\""))
            .body(envelope)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers(), Utc::now());
        let body = response.text().await.map_err(map_send_error)?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_retry_after_forms() {
        let now = Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers, now), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));
        assert_eq!(parse_retry_after(&headers, now), Some(Duration::from_secs(120)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 10 Apr 2024 12:01:30 GMT"));
        assert_eq!(parse_retry_after(&headers, now), Some(Duration::from_secs(90)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 10 Apr 2024 11:00:00 GMT"));
        assert_eq!(parse_retry_after(&headers, now), Some(Duration::ZERO));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers, now), None);
    }
}
