//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod project;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check a request file without contacting the service
    Validate {
        /// Path to the request JSON file
        file: PathBuf,
    },
    /// Submit a request file to the onboarding service
    Submit {
        /// Path to the request JSON file
        file: PathBuf,
    },
    /// Check that the onboarding service is reachable
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Validate { file } => project::validate(&file),
        Commands::Submit { file } => project::submit(&file, config).await,
        Commands::Health => project::health(config).await,
    }
}
