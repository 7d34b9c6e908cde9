//! Error types for the ETL client

use std::time::Duration;

use thiserror::Error;
use vepi_core::domain::job::JobStatus;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Errors that can occur when driving ETL jobs
#[derive(Debug, Error)]
pub enum EtlError {
    /// Input rejected before any request was sent
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The job could not be started
    #[error("Failed to start ETL job{}: {message}", status_suffix(.status))]
    Submission {
        /// HTTP status code, absent for transport failures
        status: Option<u16>,
        /// Server-provided detail or transport error text
        message: String,
    },

    /// A successful response did not have the expected shape
    #[error("Unexpected response from ETL API: {0}")]
    Protocol(String),

    /// An operation on an existing job failed
    #[error("Failed to {operation} job {job_id}{}: {message}", status_suffix(.status))]
    Control {
        /// What was being attempted (e.g. "cancel", "check status")
        operation: &'static str,
        job_id: String,
        status: Option<u16>,
        message: String,
    },

    /// The job reached a terminal failure state
    #[error("Job {job_id} ended with status {status}{}", detail_suffix(.detail))]
    JobFailed {
        job_id: String,
        status: JobStatus,
        /// Extended error detail, when it could be retrieved
        detail: Option<String>,
    },

    /// The job did not reach a terminal state before the deadline
    #[error("Job {job_id} did not complete within {timeout:?}")]
    Timeout { job_id: String, timeout: Duration },

    /// The caller abandoned the wait
    #[error("Waiting for job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// A read-back endpoint returned an error status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request to a read-back endpoint failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Reading an upload source failed
    #[error("Failed to read upload source: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl EtlError {
    /// Create a submission error from a transport failure
    pub(crate) fn submission_transport(err: reqwest::Error) -> Self {
        Self::Submission {
            status: None,
            message: err.to_string(),
        }
    }

    /// Create a control error from a transport failure
    pub(crate) fn control_transport(
        operation: &'static str,
        job_id: &str,
        err: reqwest::Error,
    ) -> Self {
        Self::Control {
            operation,
            job_id: job_id.to_string(),
            status: None,
            message: err.to_string(),
        }
    }

    /// Check if the job itself reached a failure state
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::JobFailed { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status code carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Submission { status, .. } | Self::Control { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            Self::RequestFailed(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
