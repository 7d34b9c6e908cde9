//! Job DTOs for the ETL endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST /etl/templates/{templateId}/startWithData`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartWithData {
    pub input: InlineInput,
}

/// Inline rows nested under `input`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineInput {
    pub data: Vec<Vec<serde_json::Value>>,
}

impl StartWithData {
    pub fn new(rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            input: InlineInput { data: rows },
        }
    }
}

/// JSON `metadata` part of a `startWithFile` multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadMetadata {
    pub input: FileInput,
}

/// Description of the uploaded file part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    /// Name of the multipart part carrying the file bytes
    pub part_name: String,
    pub file_format: String,
    pub file_encoding: String,
    pub file_name: String,
}

impl FileUploadMetadata {
    /// Metadata for a UTF-8 CSV carried in the `file` part
    pub fn csv(file_name: impl Into<String>) -> Self {
        Self {
            input: FileInput {
                part_name: "file".to_string(),
                file_format: "CSV".to_string(),
                file_encoding: "UTF-8".to_string(),
                file_name: file_name.into(),
            },
        }
    }
}

/// Body of `POST /etl/jobs/{jobId}/data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJobData {
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Minimal view of a response that should carry a job id
#[derive(Debug, Clone, Deserialize)]
pub struct JobCreated {
    #[serde(default)]
    pub id: Option<String>,
}

impl JobCreated {
    /// The job id, if present and non-empty
    pub fn job_id(self) -> Option<String> {
        self.id.filter(|id| !id.is_empty())
    }
}
