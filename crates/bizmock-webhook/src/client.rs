//! HTTP client for callback delivery.
//!
//! Thin wrapper over a pooled reqwest client that POSTs encoded payloads to
//! the registered callback URL with the identifying header set. Transport
//! failures and non-2xx responses are both surfaced as errors so the worker
//! applies one retry path to either.

use std::time::Duration;

use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use tracing::debug;

use crate::encoder::EncodedPayload;
use crate::error::{Result, WebhookError};

/// Configuration of the callback HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with every delivery, `<app>/<version>`.
    pub user_agent: String,
    /// Whether to verify the callback endpoint's TLS certificate.
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("BizMockserver/{}", env!("CARGO_PKG_VERSION")),
            verify_tls: true,
        }
    }
}

/// HTTP client delivering webhook payloads.
#[derive(Debug, Clone)]
pub struct CallbackClient {
    client: reqwest::Client,
}

impl CallbackClient {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Configuration`] when the client cannot be
    /// constructed from the given settings.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| WebhookError::configuration(format!("failed to build client: {e}")))?;
        Ok(Self { client })
    }

    /// POSTs a payload to `url` and returns the response status code.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Network`] when no response was received. A
    /// response outside 2xx is returned as `Ok`; classifying it is the
    /// worker's concern.
    pub async fn deliver(&self, url: &str, payload: &EncodedPayload) -> Result<u16> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.body.clone());
        if payload.gzipped {
            request = request.header(CONTENT_ENCODING, "gzip");
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                WebhookError::network(format!("request timed out: {e}"))
            } else if e.is_connect() {
                WebhookError::network(format!("connection failed: {e}"))
            } else {
                WebhookError::network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        debug!(url, status, bytes = payload.body.len(), "callback response received");
        Ok(status)
    }
}
