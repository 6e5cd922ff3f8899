//! Onboarder HTTP Client
//!
//! A small, type-safe HTTP client for the onboarding service API.
//!
//! # Example
//!
//! ```no_run
//! use onboarder_client::OnboardingClient;
//! use onboarder_core::domain::request::OnboardingRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OnboardingClient::new("http://localhost:8080");
//!
//!     let request = OnboardingRequest::parse(
//!         br#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com","cpu":2,"memory":4}"#,
//!     )?;
//!     let result = client.onboard(&request).await?;
//!
//!     println!("Created job: {}", result.name);
//!     Ok(())
//! }
//! ```

pub mod error;
mod projects;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use onboarder_core::dto::submission::{HealthStatus, SubmissionResult};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the onboarding service API
#[derive(Debug, Clone)]
pub struct OnboardingClient {
    base_url: String,
    client: Client,
}

impl OnboardingClient {
    /// Client with default reqwest settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Client over a preconfigured reqwest client (timeouts, proxies, TLS)
    ///
    /// A trailing `/` on `base_url` is dropped.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Decodes a success body, or turns an error status into [`ClientError`]
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Service returned {}: {}", status, error_text);
            return Err(ClientError::api_error(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OnboardingClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = OnboardingClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
