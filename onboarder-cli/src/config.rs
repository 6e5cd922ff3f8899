//! Connection settings shared by the commands that talk to the service

use anyhow::{Context, Result};
use onboarder_client::OnboardingClient;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: String,
    /// Whole-request deadline; the service itself waits up to its own
    /// submit timeout before answering
    pub request_timeout: Duration,
}

impl Config {
    /// Client bound to the configured service and deadline
    pub fn client(&self) -> Result<OnboardingClient> {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(OnboardingClient::with_client(&self.service_url, http))
    }
}
