//! Outbound HTTP client for the gateway JSON API
//!
//! One pooled `reqwest::Client` shared across requests, with explicit
//! timeouts. Single attempt per call, no retries.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::AppError;
use crate::logging::redact_sensitive_data;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Raw gateway response: HTTP status plus the unparsed body text
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    api_url: String,
}

impl GatewayClient {
    pub fn new(api_url: String, request_timeout_secs: u64) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, api_url })
    }

    /// POST a JSON payload to the gateway API and return the raw response.
    ///
    /// Transport failures (DNS, connect, timeout) surface as `AppError::Network`;
    /// any HTTP status with a readable body is returned to the caller as data.
    pub async fn post_json(&self, payload: &Value) -> Result<GatewayResponse, AppError> {
        debug!(url = %self.api_url, "Posting signed request to gateway");

        let response = self.http.post(&self.api_url).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(
            status,
            body = %redact_sensitive_data(&body),
            "Gateway responded"
        );
        Ok(GatewayResponse { status, body })
    }
}
