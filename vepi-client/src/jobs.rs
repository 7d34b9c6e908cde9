//! Job control endpoints

use reqwest::StatusCode;
use tracing::{error, info};
use vepi_core::domain::job::{JobDetails, JobStatus};
use vepi_core::dto::job::{JobCreated, UploadJobData};

use crate::error::{EtlError, Result};
use crate::{ApiResponse, EtlClient};

impl EtlClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Create a new, empty job from the template
    ///
    /// The job starts in the `EDITING` stage and does nothing until it is
    /// submitted with [`EtlClient::submit_job`].
    ///
    /// # Returns
    /// The id of the created job
    pub async fn create_job(&self) -> Result<String> {
        let url = self.template_url("jobs");
        let response = self
            .send(self.client.post(&url))
            .await
            .map_err(EtlError::submission_transport)?;

        check_submission(&response, "create job")?;

        let created: JobCreated = response.decode("create job response")?;
        created
            .job_id()
            .ok_or_else(|| EtlError::Protocol("Failed to create job: no job ID returned".to_string()))
    }

    /// Submit a created job for processing
    ///
    /// # Arguments
    /// * `job_id` - The id returned by [`EtlClient::create_job`] or a start call
    ///
    /// # Returns
    /// The job as reported after submission
    pub async fn submit_job(&self, job_id: &str) -> Result<JobDetails> {
        let url = format!("{}/submit", self.job_url(job_id));
        let response = self
            .send(self.client.post(&url))
            .await
            .map_err(EtlError::submission_transport)?;

        check_submission(&response, "submit job")?;

        response.decode("submit job response")
    }

    /// Get the job record, including its structured status
    ///
    /// This is the job-detail endpoint (`GET /etl/jobs/{id}`), which answers
    /// with an object. See [`EtlClient::check_job_status`] for the bare form.
    pub async fn get_job_status(&self, job_id: &str) -> Result<JobDetails> {
        let response = self.control(self.client.get(self.job_url(job_id)), "get status", job_id).await?;
        response.decode("job status")
    }

    /// Get the bare status string of a job
    ///
    /// The status endpoint (`GET /etl/jobs/{id}/status`) answers with a JSON
    /// string literal such as `"COMPLETED"` rather than an object.
    pub async fn check_job_status(&self, job_id: &str) -> Result<JobStatus> {
        let url = format!("{}/status", self.job_url(job_id));
        let response = self.control(self.client.get(&url), "check status", job_id).await?;
        response.decode("bare job status")
    }

    /// Cancel a running job
    ///
    /// # Returns
    /// The job as reported after cancellation (status `CANCELLED`)
    pub async fn cancel_job(&self, job_id: &str) -> Result<JobDetails> {
        let url = format!("{}/cancel", self.job_url(job_id));
        let response = self.control(self.client.post(&url), "cancel", job_id).await?;

        let job: JobDetails = response.decode("cancel job response")?;
        info!(
            "Job {} cancelled (status: {})",
            job_id,
            job.status.as_ref().map(JobStatus::as_str).unwrap_or("unknown")
        );
        Ok(job)
    }

    /// Attach record-shaped data to a created job before it is submitted
    ///
    /// # Arguments
    /// * `job_id` - A job still in the `EDITING` stage
    /// * `records` - One JSON object per record, keyed by column name
    pub async fn upload_job_data(
        &self,
        job_id: &str,
        records: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<serde_json::Value> {
        if records.is_empty() {
            return Err(EtlError::Validation("Data cannot be empty".to_string()));
        }

        let url = format!("{}/data", self.job_url(job_id));
        let body = UploadJobData { data: records };
        let response = self
            .control(self.client.post(&url).json(&body), "upload data to", job_id)
            .await?;

        response.decode("upload response")
    }

    /// Send a request about an existing job, mapping failures to control errors
    async fn control(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
        job_id: &str,
    ) -> Result<ApiResponse> {
        let response = self
            .send(request)
            .await
            .map_err(|e| EtlError::control_transport(operation, job_id, e))?;

        if !response.is_success() {
            if response.status == StatusCode::UNPROCESSABLE_ENTITY {
                error!("Job {} rejected request to {}: {}", job_id, operation, response.body);
            }
            return Err(EtlError::Control {
                operation,
                job_id: job_id.to_string(),
                status: response.status_code(),
                message: response.detail(),
            });
        }

        Ok(response)
    }
}

/// Map a failed create/submit response to a submission error
///
/// A 422 is how the API reports a template or job that cannot be started;
/// its body is logged in full before failing.
fn check_submission(response: &ApiResponse, operation: &str) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    if response.status == StatusCode::UNPROCESSABLE_ENTITY {
        error!("Failed to {}, error response content: {}", operation, response.body);
    }

    Err(EtlError::Submission {
        status: response.status_code(),
        message: response.detail(),
    })
}
