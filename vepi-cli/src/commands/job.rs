//! Job command handlers
//!
//! Handles the explicit job lifecycle: creating, submitting, inspecting,
//! waiting for and cancelling individual jobs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use vepi_client::EtlClient;
use vepi_core::domain::job::{JobDetails, JobStatus, StatusClass};

use super::{WaitArgs, read_json};

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Create an empty job from the template
    Create,
    /// Submit a created job for processing
    Submit {
        /// Job ID
        id: String,
    },
    /// Get job details
    Status {
        /// Job ID
        id: String,

        /// Query the bare status endpoint instead of the full record
        #[arg(long)]
        bare: bool,
    },
    /// Attach records to a created job before submitting it
    Data {
        /// Job ID
        id: String,

        /// JSON file holding an array of objects keyed by column name
        file: PathBuf,
    },
    /// Wait for a job to reach a terminal status
    Wait {
        /// Job ID
        id: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Cancel a running job
    Cancel {
        /// Job ID
        id: String,
    },
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
///
/// # Arguments
/// * `command` - The job command to execute
/// * `client` - The connected ETL client
pub async fn handle_job_command(command: JobCommands, client: &EtlClient) -> Result<()> {
    match command {
        JobCommands::Create => create_job(client).await,
        JobCommands::Submit { id } => submit_job(client, &id).await,
        JobCommands::Status { id, bare } => get_status(client, &id, bare).await,
        JobCommands::Data { id, file } => upload_data(client, &id, &file).await,
        JobCommands::Wait { id, wait } => wait_for_job(client, &id, &wait).await,
        JobCommands::Cancel { id } => cancel_job(client, &id).await,
    }
}

/// Create, submit and wait for a job in one go
pub async fn run(client: &EtlClient, wait: &WaitArgs) -> Result<()> {
    let job = client
        .run_job(wait.interval(), wait.timeout())
        .await
        .context("Job run failed")?;

    print_job_details(&job);
    Ok(())
}

async fn create_job(client: &EtlClient) -> Result<()> {
    let job_id = client.create_job().await.context("Failed to create job")?;

    println!("{} Job created: {}", "✓".green(), job_id.cyan());
    println!(
        "{}",
        format!("  Attach data with `vepi job data {} <file>`, then submit it.", job_id).dimmed()
    );
    Ok(())
}

async fn submit_job(client: &EtlClient, id: &str) -> Result<()> {
    let job = client
        .submit_job(id)
        .await
        .with_context(|| format!("Failed to submit job {}", id))?;

    println!("{} Job {} submitted", "✓".green(), id.cyan());
    print_job_details(&job);
    Ok(())
}

async fn get_status(client: &EtlClient, id: &str, bare: bool) -> Result<()> {
    if bare {
        let status = client.check_job_status(id).await?;
        println!("{}", colorize_status(&status));
        return Ok(());
    }

    let job = client.get_job_status(id).await?;
    print_job_details(&job);
    Ok(())
}

async fn upload_data(client: &EtlClient, id: &str, file: &Path) -> Result<()> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> =
        read_json(file, "an array of objects").await?;
    let count = records.len();

    let response = client
        .upload_job_data(id, records)
        .await
        .with_context(|| format!("Failed to upload data to job {}", id))?;

    println!(
        "{} Uploaded {} record(s) to job {}",
        "✓".green(),
        count,
        id.cyan()
    );
    if !response.is_null() {
        println!("{}", serde_json::to_string_pretty(&response)?.dimmed());
    }
    Ok(())
}

async fn wait_for_job(client: &EtlClient, id: &str, wait: &WaitArgs) -> Result<()> {
    let job = client
        .wait_for_job_completion(id, wait.interval(), wait.timeout())
        .await?;

    print_job_details(&job);
    Ok(())
}

async fn cancel_job(client: &EtlClient, id: &str) -> Result<()> {
    let job = client.cancel_job(id).await?;

    println!("{} Job {} cancelled", "✓".green(), id.cyan());
    print_job_details(&job);
    Ok(())
}

/// Print detailed job information
pub fn print_job_details(job: &JobDetails) {
    println!("{}", "Job Details:".bold());
    if let Some(id) = &job.id {
        println!("  ID:       {}", id.cyan());
    }
    if let Some(name) = &job.name {
        println!("  Name:     {}", name);
    }
    match &job.status {
        Some(status) => println!("  Status:   {}", colorize_status(status)),
        None => println!("  Status:   {}", "unknown".dimmed()),
    }
    if let Some(model) = job.model_name.as_ref().or(job.model_id.as_ref()) {
        println!("  Model:    {}", model);
    }
    if let Some(user) = &job.user_name {
        println!("  User:     {}", user.dimmed());
    }
    if let Some(created) = &job.created_date {
        println!("  Created:  {}", created);
    }
    if let Some(updated) = &job.updated_date {
        println!("  Updated:  {}", updated);
    }

    let has_error = job.error.as_ref().is_some_and(|e| !e.is_null());
    if has_error {
        if let Some(error) = job.failure_detail() {
            println!("\n{}", "Error:".bold());
            println!("{}", error.red());
        }
    } else if let Some(message) = &job.message {
        println!("\n{}", "Message:".bold());
        println!("{}", message);
    }

    let warnings = job.warnings();
    if !warnings.is_empty() {
        println!("\n{}", "Warnings:".bold());
        for warning in warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    match (status, status.class()) {
        (JobStatus::Cancelled, _) => status.as_str().dimmed(),
        (_, StatusClass::Succeeded) => status.as_str().green(),
        (_, StatusClass::Failed) => status.as_str().red(),
        (_, StatusClass::Pending) => status.as_str().yellow(),
    }
}
