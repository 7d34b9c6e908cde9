//! Data loading command handlers
//!
//! Sends rows or files into the configured ETL template and reports the
//! outcome of the resulting job.

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use vepi_client::{EtlClient, FileUpload};

use super::job::print_job_details;
use super::{WaitArgs, read_json};

/// Rows as read from a JSON file
type Rows = Vec<Vec<serde_json::Value>>;

/// Send rows inline and monitor until the job finishes
pub async fn import(client: &EtlClient, file: &Path) -> Result<()> {
    let rows: Rows = read_json(file, "an array of rows").await?;
    let count = rows.len();

    let job_id = client
        .import_rows(rows)
        .await
        .context("Import failed")?;

    println!(
        "{} Imported {} row(s) (job {})",
        "✓".green(),
        count,
        job_id.cyan()
    );
    Ok(())
}

/// Upload a CSV file and monitor until the job finishes
pub async fn upload(client: &EtlClient, file: &Path, name: Option<&str>) -> Result<()> {
    let mut upload = FileUpload::from_path(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if let Some(name) = name {
        upload = upload.with_file_name(name);
    }

    let job_id = client
        .submit_file(&upload)
        .await
        .context("Upload failed")?;

    println!(
        "{} Uploaded {} (job {})",
        "✓".green(),
        upload.file_name().bold(),
        job_id.cyan()
    );
    Ok(())
}

/// Send rows inline, submit, and wait with a deadline
pub async fn process(client: &EtlClient, file: &Path, wait: &WaitArgs) -> Result<()> {
    let rows: Rows = read_json(file, "an array of rows").await?;

    let job = client
        .process_data(rows, wait.interval(), wait.timeout())
        .await
        .context("Processing failed")?;

    print_job_details(&job);
    Ok(())
}
