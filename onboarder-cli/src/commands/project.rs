//! Project command handlers
//!
//! Validates request files locally and submits them to the onboarding
//! service.

use anyhow::{Context, Result};
use colored::*;
use onboarder_core::domain::request::OnboardingRequest;
use std::path::Path;

use crate::config::Config;

/// Validate a request file through the request model
pub fn validate(path: &Path) -> Result<()> {
    let request = load_request(path)?;

    println!("{}", "✓ Request is valid".green().bold());
    print_request(&request);

    Ok(())
}

/// Submit a request file to the service
pub async fn submit(path: &Path, config: &Config) -> Result<()> {
    let request = load_request(path)?;
    let client = config.client()?;

    match client.onboard(&request).await {
        Ok(result) => {
            println!("{}", "✓ Onboarding pipeline submitted!".green().bold());
            println!("  Job:       {}", result.name.cyan());
            println!("  Namespace: {}", result.namespace);
            if let Some(created_at) = result.created_at {
                println!("  Created:   {}", created_at.to_rfc3339().dimmed());
            }
            println!("  Branch:    {}", request.branch_name().bold());
            Ok(())
        }
        Err(err) => {
            let hint = if err.is_retryable() {
                "retryable: try again later".yellow()
            } else {
                "not retryable".red()
            };
            eprintln!("{} {}", "✗ Onboarding failed:".red().bold(), err);
            eprintln!("  {}", hint);
            Err(anyhow::Error::new(err).context("Submission failed"))
        }
    }
}

/// Check service health
pub async fn health(config: &Config) -> Result<()> {
    let client = config.client()?;

    let health = client
        .health()
        .await
        .with_context(|| format!("Service at {} is not healthy", client.base_url()))?;

    println!("{} {}", "✓ Service is healthy:".green().bold(), client.base_url());
    println!("  Status:  {}", health.status);
    println!("  Version: {}", health.version.dimmed());
    Ok(())
}

fn load_request(path: &Path) -> Result<OnboardingRequest> {
    let raw = std::fs::read(path)
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;

    OnboardingRequest::parse(&raw)
        .with_context(|| format!("Invalid onboarding request in {}", path.display()))
}

fn print_request(request: &OnboardingRequest) {
    println!("  Name:   {}", request.name.cyan());
    println!("  Owner:  {} ({})", request.owner, request.email.dimmed());
    println!("  Team:   {}", request.team);
    println!("  CPU:    {}", request.cpu);
    println!("  Memory: {}", request.memory);
    println!("  Branch: {}", request.branch_name().bold());

    let extras: Vec<String> = [
        ("cluster", &request.cluster),
        ("buildNumber", &request.build_number),
        ("service", &request.service),
        ("application", &request.application),
        ("domain", &request.domain),
        ("namespaceVIP", &request.namespace_vip),
        ("snatIP", &request.snat_ip),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
    .collect();

    if !extras.is_empty() {
        println!("  Extra:  {}", extras.join(", ").dimmed());
    }
}
