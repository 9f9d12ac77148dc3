//! Batch command handlers
//!
//! Submitting keyword batches, inspecting them, and acting as the external
//! caller that advances a batch one step at a time.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use quill_client::{ClientError, OrchestratorClient, StepResult, StepStatus};
use quill_core::domain::batch::{Batch, BatchStatus};
use quill_core::dto::batch::{BatchDetail, CreateBatch};
use uuid::Uuid;

use super::colorize_job_status;
use crate::config::Config;

/// Upper bound for the transport-error backoff
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Batch subcommands
#[derive(Subcommand)]
pub enum BatchCommands {
    /// Submit a batch of keywords
    Submit {
        /// Keywords, one article each
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Skip SEO analysis and scoring
        #[arg(long)]
        no_seo: bool,
    },
    /// Show a batch and its jobs
    Status {
        /// Batch ID
        id: String,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Advance the batch by one step
    Step {
        /// Batch ID
        id: String,

        /// Skip SEO for this step only
        #[arg(long)]
        no_seo: bool,
    },
    /// Advance the batch until it completes
    Drive {
        /// Batch ID
        id: String,

        /// Pause between steps
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Stop after this many consecutive no-work responses
        #[arg(long, default_value_t = 10)]
        max_idle: u32,

        /// Give up after this many consecutive transport errors
        #[arg(long, default_value_t = 8)]
        max_retries: u32,
    },
}

/// Handle batch commands
pub async fn handle_batch_command(command: BatchCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        BatchCommands::Submit { keywords, no_seo } => submit(&client, keywords, !no_seo).await,
        BatchCommands::Status { id, json } => status(&client, parse_id(&id)?, json).await,
        BatchCommands::Step { id, no_seo } => {
            let result = client
                .advance_step(parse_id(&id)?, no_seo.then_some(false))
                .await?;
            print_step(&result);
            Ok(())
        }
        BatchCommands::Drive {
            id,
            interval_ms,
            max_idle,
            max_retries,
        } => {
            let options = DriveOptions {
                interval: Duration::from_millis(interval_ms),
                max_idle,
                max_retries,
            };
            drive(&client, parse_id(&id)?, options).await
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("Invalid batch ID: {}", id))
}

async fn submit(client: &OrchestratorClient, keywords: Vec<String>, seo_enabled: bool) -> Result<()> {
    let batch = client
        .create_batch(CreateBatch {
            keywords,
            seo_enabled,
        })
        .await?;

    println!("{}", "✓ Batch submitted".green().bold());
    print_batch(&batch);
    println!();
    println!(
        "Run {} to process it.",
        format!("quill batch drive {}", batch.id).cyan()
    );

    Ok(())
}

async fn status(client: &OrchestratorClient, id: Uuid, json: bool) -> Result<()> {
    let detail = client.get_batch(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        print_batch_detail(&detail);
    }

    Ok(())
}

// =============================================================================
// Drive loop
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct DriveOptions {
    interval: Duration,
    max_idle: u32,
    max_retries: u32,
}

/// What the drive loop does after a step response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriveAction {
    Continue,
    Finished,
    Idle,
}

/// Tracks consecutive no-work responses
#[derive(Debug, Default)]
struct IdleTracker {
    consecutive: u32,
}

impl IdleTracker {
    fn observe(&mut self, result: &StepResult, max_idle: u32) -> DriveAction {
        if result.is_batch_complete() {
            return DriveAction::Finished;
        }

        match result.status {
            StepStatus::NoWork => {
                self.consecutive += 1;
                if self.consecutive >= max_idle {
                    DriveAction::Idle
                } else {
                    DriveAction::Continue
                }
            }
            StepStatus::Processing | StepStatus::Completed => {
                self.consecutive = 0;
                DriveAction::Continue
            }
        }
    }
}

/// Delay before retry `attempt` (1-based), doubling from `base` up to `MAX_BACKOFF`
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

async fn drive(client: &OrchestratorClient, id: Uuid, options: DriveOptions) -> Result<()> {
    let mut idle = IdleTracker::default();
    let mut failures = 0u32;
    let base = options.interval.max(Duration::from_millis(100));

    loop {
        let result = match client.advance_step(id, None).await {
            Ok(result) => {
                failures = 0;
                result
            }
            Err(err) if is_retryable(&err) && failures < options.max_retries => {
                failures += 1;
                let delay = backoff_delay(base, failures);
                eprintln!(
                    "{} {} (retry {}/{} in {:?})",
                    "⚠".yellow(),
                    err,
                    failures,
                    options.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        print_step(&result);

        match idle.observe(&result, options.max_idle) {
            DriveAction::Finished => break,
            DriveAction::Idle => {
                println!(
                    "{}",
                    format!(
                        "No work for {} consecutive steps, stopping. Run drive again later.",
                        options.max_idle
                    )
                    .yellow()
                );
                return Ok(());
            }
            DriveAction::Continue => tokio::time::sleep(options.interval).await,
        }
    }

    let detail = client.get_batch(id).await?;
    println!();
    print_batch_detail(&detail);

    Ok(())
}

/// Transport failures and server errors are worth another try
fn is_retryable(err: &ClientError) -> bool {
    err.is_transport() || err.is_server_error()
}

// =============================================================================
// Output
// =============================================================================

fn print_step(result: &StepResult) {
    let marker = match (result.status, &result.error) {
        (_, Some(_)) => "✗".red(),
        (StepStatus::Completed, None) => "✓".green(),
        (StepStatus::NoWork, None) => "·".dimmed(),
        (StepStatus::Processing, None) => "▸".cyan(),
    };

    let mut line = format!("{} {}", marker, result.message);
    if let Some(keyword) = &result.keyword {
        line.push_str(&format!(" [{}]", keyword.bold()));
    }
    if let (Some(step), Some(next)) = (result.step, result.next_step) {
        line.push_str(&format!(" {} → {}", step, colorize_job_status(next)));
    }
    println!("{}", line);

    if let Some(error) = &result.error {
        println!("    {}", error.red());
    }
}

fn print_batch(batch: &Batch) {
    println!("  ID:        {}", batch.id.to_string().cyan());
    println!("  Status:    {}", colorize_batch_status(batch.status));
    println!(
        "  Progress:  {}/{} done, {} failed",
        batch.completed_count, batch.total_count, batch.failed_count
    );
    println!(
        "  SEO:       {}",
        if batch.seo_enabled { "on" } else { "off" }
    );
    println!(
        "  Created:   {}",
        batch.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(completed) = batch.completed_at {
        println!("  Completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }
}

fn print_batch_detail(detail: &BatchDetail) {
    println!("{}", "Batch Details:".bold());
    print_batch(&detail.batch);

    if detail.jobs.is_empty() {
        return;
    }

    println!("\n{}", "Jobs:".bold());
    for job in &detail.jobs {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            job.keyword,
            colorize_job_status(job.status)
        );
        if let Some(error) = &job.error_message {
            println!("    {}", error.red());
        }
    }
}

fn colorize_batch_status(status: BatchStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        BatchStatus::Pending => status_str.yellow(),
        BatchStatus::Running => status_str.cyan(),
        BatchStatus::Completed => status_str.green(),
        BatchStatus::Failed => status_str.red(),
    }
}
