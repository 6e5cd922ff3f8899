//! Test doubles shared by the service and API tests

use async_trait::async_trait;
use onboarder_core::compiler::PipelineCompiler;
use onboarder_core::config::PipelineConfig;
use onboarder_core::domain::pipeline::PipelineSpec;
use onboarder_core::dto::submission::SubmissionResult;
use onboarder_scheduler::{SubmissionAdapter, SubmissionError};
use std::sync::Mutex;
use std::time::Duration;

pub const PAYMENTS: &str =
    r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com","cpu":2,"memory":4}"#;

pub fn compiler() -> PipelineCompiler {
    PipelineCompiler::new(
        PipelineConfig::new(
            "onboarding",
            "git.internal/platform/config.git",
            "config",
            "registry.internal/clingo:1.4",
        )
        .with_trust_material("rootca"),
    )
    .unwrap()
}

/// Records every submission and answers with a canned outcome
pub struct RecordingScheduler {
    failure: Option<SubmissionError>,
    submitted: Mutex<Vec<PipelineSpec>>,
    timeouts: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn accepting() -> Self {
        Self {
            failure: None,
            submitted: Mutex::new(Vec::new()),
            timeouts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: SubmissionError) -> Self {
        Self {
            failure: Some(err),
            ..Self::accepting()
        }
    }

    pub fn calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn submitted(&self) -> Vec<PipelineSpec> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionAdapter for RecordingScheduler {
    async fn submit(
        &self,
        spec: PipelineSpec,
        timeout: Duration,
    ) -> onboarder_scheduler::Result<SubmissionResult> {
        let prefix = spec.generated_name_prefix.clone();
        let namespace = spec.namespace.clone();
        self.submitted.lock().unwrap().push(spec);
        self.timeouts.lock().unwrap().push(timeout);

        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(SubmissionResult {
                name: format!("{}abcde", prefix),
                namespace,
                created_at: None,
            }),
        }
    }
}
