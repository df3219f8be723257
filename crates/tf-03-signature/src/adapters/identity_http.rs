//! HTTP adapter for the trusted identity service.
//!
//! `POST {base_url}/v1/signatures` with an `IdentitySigningRequest` JSON body;
//! a 2xx answer carries an `IdentitySignature`, 4xx means the signer was
//! rejected, anything else is treated as unavailability.

use crate::ports::outbound::{
    IdentityProvider, IdentityProviderError, IdentitySignature, IdentitySigningRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IdentityProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityProviderError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/signatures", self.base_url)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_digest(
        &self,
        request: &IdentitySigningRequest,
    ) -> Result<IdentitySignature, IdentityProviderError> {
        let mut call = self.client.post(self.endpoint()).json(request);
        if let Some(token) = &self.api_token {
            call = call.bearer_auth(token);
        }

        let response = call
            .send()
            .await
            .map_err(|e| IdentityProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityProviderError::Rejected(format!("{status}: {body}")));
        }
        if !status.is_success() {
            return Err(IdentityProviderError::Unavailable(format!("HTTP {status}")));
        }

        response
            .json::<IdentitySignature>()
            .await
            .map_err(|e| IdentityProviderError::Unavailable(format!("invalid response: {e}")))
    }
}
