//! Error types for webhook delivery.
//!
//! Every delivery failure is reported through the pipeline's error channel
//! and retried by resubmission; nothing here terminates the process.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, WebhookError>;

/// Errors raised by the webhook delivery pipeline.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    /// Serializing a delivery unit failed.
    ///
    /// Treated like a transient failure and retried, although a unit that
    /// never serializes will never succeed; see the retry notes in the crate
    /// docs.
    #[error("failed to serialize delivery unit: {message}")]
    Serialize {
        /// Serializer error message.
        message: String,
    },

    /// The HTTP request never produced a response.
    #[error("callback request failed: {message}")]
    Network {
        /// Transport error message.
        message: String,
    },

    /// The endpoint answered outside the 2xx range.
    #[error("callback to {url} failed with status {status}")]
    Endpoint {
        /// Callback URL that was attempted.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// The work queue was closed while the pipeline was still in use.
    #[error("delivery queue closed")]
    QueueClosed,

    /// The delivery client could not be constructed.
    #[error("invalid delivery configuration: {message}")]
    Configuration {
        /// Configuration error message.
        message: String,
    },

    /// Pipeline lifecycle misuse, e.g. starting twice.
    #[error("internal pipeline error: {message}")]
    Internal {
        /// Internal error message.
        message: String,
    },
}

impl WebhookError {
    /// Creates a serialization error.
    pub fn serialize(err: &serde_json::Error) -> Self {
        Self::Serialize { message: err.to_string() }
    }

    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a non-2xx endpoint error.
    pub fn endpoint(url: impl Into<String>, status: u16) -> Self {
        Self::Endpoint { url: url.into(), status }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether the worker retries the failed unit.
    ///
    /// Serialization, transport, and endpoint failures are all retried by
    /// resubmission; only lifecycle and configuration errors are terminal
    /// for the operation that raised them.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Serialize { .. } | Self::Network { .. } | Self::Endpoint { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(WebhookError::network("connection refused").is_retryable());
        assert!(WebhookError::endpoint("https://cb.example.com", 500).is_retryable());
        assert!(WebhookError::endpoint("https://cb.example.com", 404).is_retryable());
        assert!(!WebhookError::QueueClosed.is_retryable());
        assert!(!WebhookError::configuration("bad client").is_retryable());
    }

    #[test]
    fn display_includes_status() {
        let err = WebhookError::endpoint("https://cb.example.com/hook", 503);
        assert_eq!(
            err.to_string(),
            "callback to https://cb.example.com/hook failed with status 503"
        );
    }
}
