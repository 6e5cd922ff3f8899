//! Dry-run submission
//!
//! Renders the Job document and logs it instead of creating it. Lets the
//! service run on a workstation without cluster credentials.

use async_trait::async_trait;
use chrono::Utc;
use onboarder_core::domain::pipeline::PipelineSpec;
use onboarder_core::dto::submission::SubmissionResult;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::SubmissionAdapter;
use crate::error::{Result, SubmissionError};
use crate::manifest::render_job;

/// Submission adapter that never leaves the process
#[derive(Debug, Clone, Default)]
pub struct DryRunScheduler;

impl DryRunScheduler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubmissionAdapter for DryRunScheduler {
    async fn submit(&self, spec: PipelineSpec, _timeout: Duration) -> Result<SubmissionResult> {
        let document = serde_json::to_string_pretty(&render_job(&spec))
            .map_err(|e| SubmissionError::permanent(format!("failed to render job: {}", e)))?;

        // Mimics the API server's 5 character generated-name suffix
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(5).collect();
        let name = format!("{}{}", spec.generated_name_prefix, suffix);

        info!("Dry run: would create job {} in namespace {}", name, spec.namespace);
        info!("{}", document);

        Ok(SubmissionResult {
            name,
            namespace: spec.namespace,
            created_at: Some(Utc::now()),
        })
    }
}
