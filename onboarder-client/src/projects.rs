//! Project onboarding endpoints

use crate::OnboardingClient;
use crate::error::Result;
use onboarder_core::domain::request::OnboardingRequest;
use onboarder_core::dto::submission::{HealthStatus, SubmissionResult};

impl OnboardingClient {
    /// Onboard a project
    ///
    /// # Returns
    /// The identifier the scheduler assigned to the onboarding pipeline
    ///
    /// # Errors
    /// [`crate::ClientError::ApiError`] carries the service's error kind;
    /// use [`crate::ClientError::is_retryable`] to decide on a retry.
    pub async fn onboard(&self, request: &OnboardingRequest) -> Result<SubmissionResult> {
        let url = format!("{}/project", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        self.handle_response(response).await
    }

    /// Check that the service is up
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
