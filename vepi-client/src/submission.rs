//! Job submission
//!
//! A job can be started straight from a template in two wire encodings: inline
//! JSON rows (`startWithData`) or a multipart CSV upload (`startWithFile`).
//! Both are [`JobLauncher`]s; they only differ in how the request is built,
//! and both hand the resulting job id to the same status poller.

use std::path::Path;

use async_trait::async_trait;
use chrono::Local;
use reqwest::multipart::{Form, Part};
use tracing::{error, info};
use vepi_core::domain::export::cell_text;
use vepi_core::dto::job::{FileUploadMetadata, JobCreated, StartWithData};

use crate::EtlClient;
use crate::error::{EtlError, Result};

/// Something that can start a job and report its id
#[async_trait]
pub trait JobLauncher: Send + Sync {
    /// Short description used in logs
    fn describe(&self) -> String;

    /// Issue the start request and return the id of the created job
    ///
    /// Failures to reach the API or non-2xx responses are
    /// [`EtlError::Submission`]; a 2xx without an id is [`EtlError::Protocol`].
    async fn launch(&self, client: &EtlClient) -> Result<String>;
}

// =============================================================================
// Inline JSON rows
// =============================================================================

/// Rows sent inline as `{"input": {"data": rows}}`
#[derive(Debug, Clone)]
pub struct InlineData {
    rows: Vec<Vec<serde_json::Value>>,
}

impl InlineData {
    /// Validate and wrap a rectangular, non-empty set of rows
    pub fn new(rows: Vec<Vec<serde_json::Value>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(EtlError::Validation("Data cannot be empty".to_string()));
        };

        let width = first.len();
        if width == 0 {
            return Err(EtlError::Validation("Rows cannot be empty".to_string()));
        }

        if let Some(index) = rows.iter().position(|row| row.len() != width) {
            return Err(EtlError::Validation(format!(
                "Row {} has {} values, expected {}",
                index,
                rows[index].len(),
                width
            )));
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<serde_json::Value>] {
        &self.rows
    }
}

#[async_trait]
impl JobLauncher for InlineData {
    fn describe(&self) -> String {
        format!("{} inline row(s)", self.rows.len())
    }

    async fn launch(&self, client: &EtlClient) -> Result<String> {
        let url = client.template_url("startWithData");
        let body = StartWithData::new(self.rows.clone());

        let response = client
            .send(client.client.post(&url).json(&body))
            .await
            .map_err(EtlError::submission_transport)?;

        if !response.is_success() {
            return Err(EtlError::Submission {
                status: response.status_code(),
                message: response.detail(),
            });
        }

        created_job_id(response.decode("start response")?)
    }
}

// =============================================================================
// Multipart CSV upload
// =============================================================================

/// One part of a multipart request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Form field name
    pub name: &'static str,
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// CSV content uploaded as a file
#[derive(Debug, Clone)]
pub struct FileUpload {
    file_name: String,
    content: Vec<u8>,
}

impl FileUpload {
    /// Upload already-serialized CSV text
    ///
    /// Without a file name, a timestamped `data_upload_*.csv` name is used.
    pub fn from_csv(content: impl Into<String>, file_name: Option<&str>) -> Self {
        Self {
            file_name: file_name.map(str::to_string).unwrap_or_else(default_file_name),
            content: content.into().into_bytes(),
        }
    }

    /// Upload raw file bytes (expected to be UTF-8 CSV)
    pub fn from_bytes(content: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Read a CSV file from disk, named after its base name
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(default_file_name);

        Ok(Self { file_name, content })
    }

    /// Serialize a header row and data rows to CSV
    ///
    /// Every value is written as text; JSON strings lose their quotes.
    pub fn from_rows(
        headers: &[String],
        rows: &[Vec<serde_json::Value>],
        file_name: Option<&str>,
    ) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let csv_error = |e: csv::Error| EtlError::Validation(format!("Failed to write CSV: {}", e));

        writer.write_record(headers).map_err(csv_error)?;
        for row in rows {
            writer
                .write_record(row.iter().map(cell_text))
                .map_err(csv_error)?;
        }

        let content = writer
            .into_inner()
            .map_err(|e| EtlError::Validation(format!("Failed to write CSV: {}", e)))?;

        Ok(Self {
            file_name: file_name.map(str::to_string).unwrap_or_else(default_file_name),
            content,
        })
    }

    /// Replace the file name reported to the API
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Reject content that is empty or whitespace only
    pub fn validate(&self) -> Result<()> {
        if self.content.iter().all(u8::is_ascii_whitespace) {
            return Err(EtlError::Validation("File is empty".to_string()));
        }
        Ok(())
    }

    /// The two parts of the upload body: `file` and `metadata`
    pub fn parts(&self) -> Result<Vec<MultipartPart>> {
        self.validate()?;

        let metadata = serde_json::to_vec(&FileUploadMetadata::csv(&self.file_name))
            .map_err(|e| EtlError::Validation(format!("Failed to encode metadata: {}", e)))?;

        Ok(vec![
            MultipartPart {
                name: "file",
                file_name: self.file_name.clone(),
                content_type: "text/csv; charset=utf-8",
                body: self.content.clone(),
            },
            MultipartPart {
                name: "metadata",
                file_name: "metadata.json".to_string(),
                content_type: "application/json",
                body: metadata,
            },
        ])
    }

    fn form(&self) -> Result<Form> {
        let mut form = Form::new();
        for part in self.parts()? {
            let body = Part::bytes(part.body)
                .file_name(part.file_name)
                .mime_str(part.content_type)
                .map_err(|e| EtlError::Validation(format!("Invalid content type: {}", e)))?;
            form = form.part(part.name, body);
        }
        Ok(form)
    }
}

#[async_trait]
impl JobLauncher for FileUpload {
    fn describe(&self) -> String {
        format!("file {} ({} bytes)", self.file_name, self.content.len())
    }

    async fn launch(&self, client: &EtlClient) -> Result<String> {
        let form = self.form()?;
        let url = client.template_url("startWithFile");

        let response = client
            .send(client.client.post(&url).multipart(form))
            .await
            .map_err(EtlError::submission_transport)?;

        if !response.is_success() {
            return Err(EtlError::Submission {
                status: response.status_code(),
                message: response.detail(),
            });
        }

        created_job_id(response.decode("start response")?)
    }
}

fn created_job_id(created: JobCreated) -> Result<String> {
    created
        .job_id()
        .ok_or_else(|| EtlError::Protocol("No job ID received from ETL API".to_string()))
}

fn default_file_name() -> String {
    format!("data_upload_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}

impl EtlClient {
    // =============================================================================
    // Job Submission
    // =============================================================================

    /// Start a job with any launcher and return its id without waiting
    pub async fn start(&self, launcher: &dyn JobLauncher) -> Result<String> {
        info!("Starting ETL job with {}", launcher.describe());

        match launcher.launch(self).await {
            Ok(job_id) => {
                info!("ETL job started with ID: {}", job_id);
                Ok(job_id)
            }
            Err(e) => {
                error!("Failed to start ETL job: {}", e);
                Err(e)
            }
        }
    }

    /// Start a job and monitor it until it completes
    ///
    /// The job id is returned once the job has reached `COMPLETED`.
    pub async fn start_and_monitor(&self, launcher: &dyn JobLauncher) -> Result<String> {
        let job_id = self.start(launcher).await?;
        self.monitor_job(&job_id).await?;
        Ok(job_id)
    }

    /// Send rows inline to the template, starting a job
    ///
    /// Only starts the job; nothing is polled. Empty or ragged input fails
    /// with [`EtlError::Validation`] before any request is made.
    ///
    /// # Example
    /// ```no_run
    /// # use vepi_client::{ClientConfig, EtlClient};
    /// # use serde_json::json;
    /// # async fn example() -> vepi_client::Result<()> {
    /// let client = EtlClient::new(ClientConfig::new("us1", "user", "key", "tmpl"))?;
    /// let job_id = client
    ///     .submit_inline_data(vec![vec![json!("4000"), json!(12.5)]])
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_inline_data(&self, rows: Vec<Vec<serde_json::Value>>) -> Result<String> {
        let data = InlineData::new(rows)?;
        self.start(&data).await
    }

    /// Upload a CSV file to the template and wait for the job to complete
    ///
    /// # Returns
    /// The id of the completed job
    pub async fn submit_file(&self, upload: &FileUpload) -> Result<String> {
        upload.validate()?;
        self.start_and_monitor(upload).await
    }
}
