//! End-to-end job workflows
//!
//! Compositions of submission, control and polling. Each stage fails fast;
//! nothing is compensated (no automatic cancel) when a later stage fails.

use std::time::Duration;

use tracing::{info, warn};
use vepi_core::domain::job::{JobDetails, JobStatus};

use crate::EtlClient;
use crate::error::Result;

impl EtlClient {
    // =============================================================================
    // Workflows
    // =============================================================================

    /// Send rows inline and monitor the job until it completes
    ///
    /// The simple import flow: start with data, then poll the bare status
    /// endpoint with the client's monitor schedule.
    ///
    /// # Returns
    /// The id of the completed job
    pub async fn import_rows(&self, rows: Vec<Vec<serde_json::Value>>) -> Result<String> {
        let job_id = self.submit_inline_data(rows).await?;
        self.monitor_job(&job_id).await?;
        info!("Data import finished (job {})", job_id);
        Ok(job_id)
    }

    /// Send rows inline, submit the resulting job, and wait with a deadline
    ///
    /// # Arguments
    /// * `rows` - Non-empty rectangular rows
    /// * `poll_interval` - Delay between status checks
    /// * `timeout` - Maximum time to wait for a terminal state
    ///
    /// # Returns
    /// The final job record
    pub async fn process_data(
        &self,
        rows: Vec<Vec<serde_json::Value>>,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<JobDetails> {
        let job_id = self.submit_inline_data(rows).await?;

        self.submit_job(&job_id).await?;
        info!("Job {} submitted", job_id);

        self.wait_for_job_completion(&job_id, poll_interval, timeout)
            .await
    }

    /// Create an empty job, submit it, and wait with a deadline
    ///
    /// The fully explicit lifecycle; no data is sent with the job.
    ///
    /// # Returns
    /// The final job record, whose `error` and `warnings` are logged when present
    pub async fn run_job(&self, poll_interval: Duration, timeout: Duration) -> Result<JobDetails> {
        info!("Creating job...");
        let job_id = self.create_job().await?;
        info!("Job created successfully with ID: {}", job_id);

        let initial = self.get_job_status(&job_id).await?;
        info!(
            "Initial job status: {}",
            initial
                .status
                .as_ref()
                .map(JobStatus::as_str)
                .unwrap_or("unknown")
        );

        info!("Submitting job...");
        let submitted = self.submit_job(&job_id).await?;
        info!(
            "Job {} submitted (status: {})",
            job_id,
            submitted
                .status
                .as_ref()
                .map(JobStatus::as_str)
                .unwrap_or("unknown")
        );

        info!("Waiting for job completion...");
        let final_status = self
            .wait_for_job_completion(&job_id, poll_interval, timeout)
            .await?;

        if let Some(error) = final_status.failure_detail() {
            warn!("Job {} reported error: {}", job_id, error);
        }
        for warning in final_status.warnings() {
            warn!("Job {} warning: {}", job_id, warning);
        }

        Ok(final_status)
    }
}
