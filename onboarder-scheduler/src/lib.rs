//! Onboarder Scheduler
//!
//! The boundary between compiled pipelines and the cluster that runs them.
//!
//! [`SubmissionAdapter`] is the only thing the onboarding service depends on.
//! Two implementations ship with the crate:
//! - [`KubeScheduler`]: creates a `batch/v1` Job through the Kubernetes API
//! - [`DryRunScheduler`]: renders and logs the Job without contacting a cluster
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use onboarder_scheduler::{KubeScheduler, SubmissionAdapter};
//! # async fn example(spec: onboarder_core::domain::pipeline::PipelineSpec) -> anyhow::Result<()> {
//! let scheduler = KubeScheduler::try_default().await?;
//! let result = scheduler.submit(spec, Duration::from_secs(10)).await?;
//! println!("Created job {}", result.name);
//! # Ok(())
//! # }
//! ```

mod dry_run;
pub mod error;
mod kubernetes;
pub mod manifest;

pub use dry_run::DryRunScheduler;
pub use error::{Result, SubmissionError};
pub use kubernetes::KubeScheduler;

use async_trait::async_trait;
use onboarder_core::domain::pipeline::PipelineSpec;
use onboarder_core::dto::submission::SubmissionResult;
use std::future::Future;
use std::time::Duration;

/// Hands compiled pipelines to a cluster scheduler
///
/// Each call creates at most one workload. Implementations never retry;
/// retry policy belongs to the caller, guided by
/// [`SubmissionError::is_retryable`]. There is no way to
/// inspect, await or cancel a submitted pipeline.
#[async_trait]
pub trait SubmissionAdapter: Send + Sync {
    /// Submits the pipeline, giving up after `timeout`
    ///
    /// # Errors
    /// [`SubmissionError::Transient`] on timeouts and unavailability,
    /// [`SubmissionError::Permanent`] when the scheduler refuses the workload.
    async fn submit(&self, spec: PipelineSpec, timeout: Duration) -> Result<SubmissionResult>;
}

/// Bounds a scheduler call by `timeout`, reporting expiry as transient
pub async fn with_timeout<F, T>(timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| SubmissionError::timed_out(timeout))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let ok = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<()> = with_timeout(Duration::from_secs(1), async {
            Err(SubmissionError::permanent("forbidden"))
        })
        .await;
        assert_eq!(err, Err(SubmissionError::permanent("forbidden")));
    }

    #[tokio::test]
    async fn test_with_timeout_expires_as_transient() {
        let result: Result<()> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_retryable());
    }
}
