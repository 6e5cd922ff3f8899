//! Error types for the Onboarder client

use onboarder_core::dto::submission::ErrorResponse;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Onboarder client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Stable error tag, when the service sent a structured body
        kind: Option<String>,
        /// Error message from the API
        message: String,
        /// Whether the service marked the failure as retryable
        retryable: bool,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and response body
    ///
    /// Structured error bodies keep their kind and retry hint; anything else
    /// is kept verbatim as the message.
    pub fn api_error(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(err) => Self::ApiError {
                status,
                kind: Some(err.kind),
                message: err.error,
                retryable: err.retryable,
            },
            Err(_) => Self::ApiError {
                status,
                kind: None,
                message: body.to_string(),
                retryable: status == 503,
            },
        }
    }

    /// Check if repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { retryable, .. } => *retryable,
            Self::RequestFailed(e) => e.is_timeout() || e.is_connect(),
            Self::ParseError(_) => false,
        }
    }
}
