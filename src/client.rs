//! Typed client stub for `calculator.CalculatorService`.

use crate::proto::{CalculateRequest, CalculateResponse, CALCULATE_PATH};
use crate::rpc::{RpcError, CONNECT_PROTOCOL_VERSION, PROTOCOL_VERSION};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Protocol-level failure reported by the server.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("failed to decode response (HTTP {status}): {source}")]
    Decode {
        status: u16,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CalculatorClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CalculatorClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_http_client(http, base_url))
    }

    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CALCULATE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Calls `Calculate`. Division by zero comes back as `Ok` with a non-empty
    /// `error`; anything the server rejects comes back as [`ClientError::Rpc`].
    pub async fn calculate(
        &self,
        request: &CalculateRequest,
    ) -> Result<CalculateResponse, ClientError> {
        debug!(endpoint = %self.endpoint, ?request, "calling Calculate");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONNECT_PROTOCOL_VERSION, PROTOCOL_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        if !(200..300).contains(&status) {
            return Err(RpcError::from_http_response(status, &body).into());
        }

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { status, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let http = reqwest::Client::new();
        let client = CalculatorClient::with_http_client(http.clone(), "http://localhost:8080/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/calculator.CalculatorService/Calculate"
        );

        let client = CalculatorClient::with_http_client(http, DEFAULT_BASE_URL);
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/calculator.CalculatorService/Calculate"
        );
    }

    #[test]
    fn test_rpc_error_display_is_transparent() {
        let error = ClientError::from(RpcError::invalid_argument("unknown operation: 99"));
        assert_eq!(error.to_string(), "invalid_argument: unknown operation: 99");
    }
}
