//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod batch;
mod blog;

pub use batch::BatchCommands;
pub use blog::BlogCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use quill_core::domain::job::JobStatus;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Batch submission and dispatch
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },
    /// Generated articles
    Blog {
        #[command(subcommand)]
        command: BlogCommands,
    },
    /// Check that the orchestrator is reachable
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Batch { command } => batch::handle_batch_command(command, config).await,
        Commands::Blog { command } => blog::handle_blog_command(command, config).await,
        Commands::Health => {
            config.client().health().await?;
            println!("{} {}", "✓".green(), config.orchestrator_url);
            Ok(())
        }
    }
}

/// Colorize job status for display
pub(crate) fn colorize_job_status(status: JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Researching | JobStatus::Analyzing | JobStatus::Writing => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
