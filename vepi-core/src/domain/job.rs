//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an ETL job as reported by the remote system
///
/// Only the terminal values are given their own variants. Every other value
/// (`EDITING`, `PENDING`, `RUNNING`, ...) is kept verbatim in `Other` and is
/// treated as non-terminal, so new server-side states never break polling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Completed,
    Error,
    Cancelled,
    Failed,
    Other(String),
}

/// Classification of a status observed at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// The job is still moving; keep polling
    Pending,
    /// The job finished successfully
    Succeeded,
    /// The job stopped and will not complete
    Failed,
}

impl JobStatus {
    /// Parse a status string as emitted by either status endpoint
    pub fn parse(value: &str) -> Self {
        match value {
            "COMPLETED" => JobStatus::Completed,
            "ERROR" => JobStatus::Error,
            "CANCELLED" => JobStatus::Cancelled,
            "FAILED" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// The wire spelling of this status
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Completed => "COMPLETED",
            JobStatus::Error => "ERROR",
            JobStatus::Cancelled => "CANCELLED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(other) => other,
        }
    }

    pub fn class(&self) -> StatusClass {
        match self {
            JobStatus::Completed => StatusClass::Succeeded,
            JobStatus::Error | JobStatus::Cancelled | JobStatus::Failed => StatusClass::Failed,
            JobStatus::Other(_) => StatusClass::Pending,
        }
    }

    /// Whether no further transition can follow this status
    pub fn is_terminal(&self) -> bool {
        self.class() != StatusClass::Pending
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        JobStatus::parse(&value)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job record returned by the job-detail endpoint (`GET /etl/jobs/{id}`)
///
/// Also returned by create/submit/cancel. Fields the client does not model are
/// kept in `extra` so nothing the server sends is lost when displaying a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl JobDetails {
    /// Human-readable failure detail, preferring `error`, then `message`
    pub fn failure_detail(&self) -> Option<String> {
        match &self.error {
            Some(serde_json::Value::Null) | None => self.message.clone(),
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Warnings reported for the job, empty when the server sent none
    pub fn warnings(&self) -> &[String] {
        self.warnings.as_deref().unwrap_or_default()
    }
}
