//! Onboarder CLI
//!
//! Command-line interface for validating and submitting onboarding requests.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "onboarder")]
#[command(about = "Project onboarding CLI", long_about = None)]
struct Cli {
    /// Onboarding service URL
    #[arg(long, env = "ONBOARDER_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Seconds to wait for the service to answer
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        service_url: cli.url,
        request_timeout: Duration::from_secs(cli.timeout),
    };

    handle_command(cli.command, &config).await
}
