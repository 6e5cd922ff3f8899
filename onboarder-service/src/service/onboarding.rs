//! Onboarding Service
//!
//! Takes one raw request through `received → compiled → submitted`.
//! Validation and compilation finish before the scheduler is contacted, so
//! a malformed request never causes a side effect. Nothing is retried here.

use onboarder_core::compiler::PipelineCompiler;
use onboarder_core::domain::request::{OnboardingRequest, ValidationError};
use onboarder_core::dto::submission::SubmissionResult;
use onboarder_scheduler::{SubmissionAdapter, SubmissionError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Span, debug, field, info, info_span, warn};
use uuid::Uuid;

/// Where a request is in its single pass through the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStage {
    Received,
    Compiled,
    Submitted,
}

/// Service error type
#[derive(Debug)]
pub enum OnboardingError {
    Validation(ValidationError),
    Submission(SubmissionError),
}

impl From<ValidationError> for OnboardingError {
    fn from(err: ValidationError) -> Self {
        OnboardingError::Validation(err)
    }
}

impl From<SubmissionError> for OnboardingError {
    fn from(err: SubmissionError) -> Self {
        OnboardingError::Submission(err)
    }
}

impl OnboardingError {
    /// Stable tag reported to callers
    pub fn kind(&self) -> &'static str {
        match self {
            OnboardingError::Validation(_) => "validation",
            OnboardingError::Submission(SubmissionError::Transient { .. }) => "submission_transient",
            OnboardingError::Submission(SubmissionError::Permanent { .. }) => "submission_permanent",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            OnboardingError::Validation(_) => false,
            OnboardingError::Submission(err) => err.is_retryable(),
        }
    }

    /// Last stage reached before the failure
    pub fn stage(&self) -> OnboardingStage {
        match self {
            OnboardingError::Validation(_) => OnboardingStage::Received,
            OnboardingError::Submission(_) => OnboardingStage::Compiled,
        }
    }

    pub fn message(&self) -> String {
        match self {
            OnboardingError::Validation(err) => err.to_string(),
            OnboardingError::Submission(err) => err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OnboardingError>;

/// Validates, compiles and submits onboarding requests
pub struct OnboardingService {
    compiler: PipelineCompiler,
    scheduler: Arc<dyn SubmissionAdapter>,
    submit_timeout: Duration,
}

impl OnboardingService {
    pub fn new(
        compiler: PipelineCompiler,
        scheduler: Arc<dyn SubmissionAdapter>,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            compiler,
            scheduler,
            submit_timeout,
        }
    }

    /// Onboards the project described by `payload`
    ///
    /// Returns as soon as the scheduler accepted the pipeline; the pipeline
    /// itself runs later and its outcome is not observed.
    pub async fn onboard(&self, payload: &[u8]) -> Result<SubmissionResult> {
        let span = info_span!(
            "onboard",
            request_id = %Uuid::new_v4(),
            project = field::Empty
        );

        async {
            let outcome = self.traverse(payload).await;
            if let Err(err) = &outcome {
                warn!(
                    "Onboarding failed after {:?}: [{}] {}",
                    err.stage(),
                    err.kind(),
                    err.message()
                );
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn traverse(&self, payload: &[u8]) -> Result<SubmissionResult> {
        let request = OnboardingRequest::parse(payload)?;
        Span::current().record("project", request.name.as_str());
        debug!("{:?}: request for project {}", OnboardingStage::Received, request.name);

        let spec = self.compiler.compile(&request);
        debug!(
            "{:?}: {} steps, prefix {}",
            OnboardingStage::Compiled,
            spec.steps.len(),
            spec.generated_name_prefix
        );

        let result = self.scheduler.submit(spec, self.submit_timeout).await?;
        info!(
            "{:?}: job {} in namespace {}",
            OnboardingStage::Submitted,
            result.name,
            result.namespace
        );

        Ok(result)
    }
}
