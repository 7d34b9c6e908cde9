//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod load;
mod model;

pub use job::JobCommands;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use vepi_client::{DEFAULT_PAGE_SIZE, DEFAULT_WAIT_INTERVAL, DEFAULT_WAIT_TIMEOUT, EtlClient};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send rows inline and monitor the job until it finishes
    Import {
        /// JSON file holding an array of rows (arrays of values)
        file: PathBuf,
    },
    /// Upload a CSV file and monitor the job until it finishes
    Upload {
        /// CSV file to upload
        file: PathBuf,

        /// File name reported to the API (default: the file's own name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Send rows inline, submit the job and wait for it with a deadline
    Process {
        /// JSON file holding an array of rows (arrays of values)
        file: PathBuf,

        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Create an empty job, submit it and wait for it with a deadline
    Run {
        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Job control
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Export every intersection of the configured model
    Export {
        /// Records requested per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Write the full table as JSON to this file instead of printing a preview
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rows shown in the preview
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the dimension hierarchy of the configured model
    Hierarchy,
}

/// Timing flags for the deadline-bounded wait
#[derive(Args)]
pub struct WaitArgs {
    /// Seconds between status checks
    #[arg(long, default_value_t = DEFAULT_WAIT_INTERVAL.as_secs())]
    pub interval: u64,

    /// Seconds to wait for a terminal status before giving up
    #[arg(long, default_value_t = DEFAULT_WAIT_TIMEOUT.as_secs())]
    pub timeout: u64,
}

impl WaitArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `client` - The connected ETL client
///
/// # Returns
/// Result indicating success or failure
pub async fn handle_command(command: Commands, client: &EtlClient) -> Result<()> {
    match command {
        Commands::Import { file } => load::import(client, &file).await,
        Commands::Upload { file, name } => load::upload(client, &file, name.as_deref()).await,
        Commands::Process { file, wait } => load::process(client, &file, &wait).await,
        Commands::Run { wait } => job::run(client, &wait).await,
        Commands::Job { command } => job::handle_job_command(command, client).await,
        Commands::Export {
            page_size,
            output,
            limit,
        } => model::export(client, page_size, output.as_deref(), limit).await,
        Commands::Hierarchy => model::hierarchy(client).await,
    }
}

/// Read a JSON document from disk
async fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&text)
        .with_context(|| format!("{} must contain {}", path.display(), what))
}
