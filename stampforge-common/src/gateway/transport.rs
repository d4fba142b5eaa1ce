//! HTTP transport abstraction for the data-source gateway
//!
//! The gateway talks to providers through this trait so tests can
//! substitute doubles and exercise the fallback chain without a network.

use crate::error::TxBuildError;
use async_trait::async_trait;
use std::time::Duration;

/// One GET request returning parsed JSON.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Fetch `url` and parse the body as JSON. Non-2xx statuses and
    /// transport failures are errors; the gateway decides what to do
    /// with them.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TxBuildError>;
}

/// Transport backed by a shared `reqwest` client with a per-request
/// timeout. One client is reused across requests for connection pooling.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TxBuildError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TxBuildError::Provider(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProviderTransport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TxBuildError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TxBuildError::Provider(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TxBuildError::Provider(format!(
                "GET {} returned HTTP {}",
                url, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TxBuildError::Provider(format!("GET {} returned invalid JSON: {}", url, e)))
    }
}
