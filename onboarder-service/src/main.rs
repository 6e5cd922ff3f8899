//! Onboarder Service
//!
//! Accepts project onboarding requests over HTTP, compiles each into a
//! pipeline and submits it to the cluster scheduler. Submission is
//! fire-and-forget: the response carries the workload identifier, and the
//! pipeline's progress is observed through the scheduler itself.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use onboarder_core::compiler::PipelineCompiler;
use onboarder_scheduler::{DryRunScheduler, KubeScheduler, SubmissionAdapter};

use crate::api::AppState;
use crate::config::{Config, SchedulerKind};
use crate::service::OnboardingService;

pub mod api;
pub mod config;
pub mod service;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "onboarder_service=info,onboarder_scheduler=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Onboarder Service...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let compiler =
        PipelineCompiler::new(config.pipeline.clone()).context("Invalid pipeline configuration")?;

    info!(
        "Pipelines target namespace {} as service account {}",
        config.pipeline.namespace, config.pipeline.service_account
    );

    let scheduler: Arc<dyn SubmissionAdapter> = match config.scheduler {
        SchedulerKind::Kube => {
            info!("Connecting to Kubernetes API...");
            Arc::new(
                KubeScheduler::try_default()
                    .await
                    .context("Failed to create Kubernetes client")?,
            )
        }
        SchedulerKind::DryRun => {
            warn!("Dry-run scheduler selected; jobs are rendered but not created");
            Arc::new(DryRunScheduler::new())
        }
    };

    let service = OnboardingService::new(compiler, scheduler, config.submit_timeout);

    // Build router with all API endpoints
    let app = api::create_router(AppState::new(service));

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
