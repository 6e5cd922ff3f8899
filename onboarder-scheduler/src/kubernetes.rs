//! Kubernetes submission
//!
//! Creates one `batch/v1` Job per pipeline in the pipeline's namespace.
//! Sequencing, stop-on-first-failure and whole-pod restarts are then the
//! cluster's business.

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, PostParams};
use kube::Client;
use onboarder_core::domain::pipeline::PipelineSpec;
use onboarder_core::dto::submission::SubmissionResult;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, SubmissionError};
use crate::manifest::render_job;
use crate::{SubmissionAdapter, with_timeout};

/// Submission adapter backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeScheduler {
    client: Client,
}

impl KubeScheduler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects using the in-cluster service account, falling back to the
    /// local kubeconfig
    pub async fn try_default() -> std::result::Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl SubmissionAdapter for KubeScheduler {
    async fn submit(&self, spec: PipelineSpec, timeout: Duration) -> Result<SubmissionResult> {
        let job = render_job(&spec);
        let jobs: Api<Job> = Api::namespaced(self.client.clone(), &spec.namespace);

        debug!(
            "Creating job {}* in namespace {}",
            spec.generated_name_prefix, spec.namespace
        );

        let created = with_timeout(timeout, async {
            jobs.create(&PostParams::default(), &job)
                .await
                .map_err(classify)
        })
        .await?;

        let name = created.metadata.name.ok_or_else(|| {
            SubmissionError::permanent("scheduler accepted the job but returned no name")
        })?;

        info!("Created job {} in namespace {}", name, spec.namespace);

        Ok(SubmissionResult {
            name,
            namespace: created.metadata.namespace.unwrap_or(spec.namespace),
            created_at: created.metadata.creation_timestamp.map(|t| t.0),
        })
    }
}

/// Sorts API failures into retryable and final
fn classify(err: kube::Error) -> SubmissionError {
    match err {
        kube::Error::Api(response) => {
            let message = format!(
                "{} ({}): {}",
                response.reason, response.code, response.message
            );
            if is_transient_status(response.code) {
                warn!("Job creation failed transiently: {}", message);
                SubmissionError::transient(message)
            } else {
                warn!("Job creation rejected: {}", message);
                SubmissionError::permanent(message)
            }
        }
        kube::Error::SerdeError(e) => {
            SubmissionError::permanent(format!("invalid job document: {}", e))
        }
        kube::Error::BuildRequest(e) => {
            SubmissionError::permanent(format!("invalid job request: {}", e))
        }
        other => {
            warn!("Job creation failed transiently: {}", other);
            SubmissionError::transient(other.to_string())
        }
    }
}

/// Timeouts, generated-name conflicts, throttling and server faults.
fn is_transient_status(code: u16) -> bool {
    matches!(code, 408 | 409 | 429) || code >= 500
}
