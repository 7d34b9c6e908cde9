//! Vepi HTTP Client
//!
//! A type-safe client for driving jobs through the Vena public ETL API.
//!
//! Jobs are started either implicitly, by sending data straight to a template
//! (inline JSON rows or a multipart CSV upload), or explicitly, by creating an
//! empty job and submitting it. Both paths converge on the same status poller,
//! which waits for the job to reach a terminal state.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vepi_client::{ClientConfig, EtlClient, FileUpload};
//!
//! #[tokio::main]
//! async fn main() -> vepi_client::Result<()> {
//!     let config = ClientConfig::new("us1", "api-user", "api-key", "template-id");
//!     let client = EtlClient::new(config)?;
//!
//!     // Upload a CSV and block until the job completes
//!     let upload = FileUpload::from_csv("Account,Value\n4000,12\n", Some("load.csv"));
//!     let job_id = client.submit_file(&upload).await?;
//!     println!("Job {} completed", job_id);
//!
//!     // Or drive the explicit lifecycle with a deadline
//!     let status = client
//!         .run_job(Duration::from_secs(5), Duration::from_secs(3600))
//!         .await?;
//!     println!("Final status: {:?}", status.status);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
mod export;
mod jobs;
mod pipeline;
pub mod poller;
pub mod submission;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{EtlError, Result};
pub use export::DEFAULT_PAGE_SIZE;
pub use poller::{
    BareStatus, DEFAULT_WAIT_INTERVAL, DEFAULT_WAIT_TIMEOUT, JobDetailStatus, Observation,
    PollSchedule, StatusSource, poll_job,
};
pub use submission::{FileUpload, InlineData, JobLauncher, MultipartPart};
pub use vepi_core::domain::export::{HierarchyMember, IntersectionTable};
pub use vepi_core::domain::job::{JobDetails, JobStatus, StatusClass};

use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// HTTP client for the ETL API
///
/// This client provides methods for all ETL endpoints, organized into
/// logical groups:
/// - Job submission (inline data, file upload)
/// - Job control (create, submit, status, cancel, data upload)
/// - Status polling and the end-to-end workflows built on it
/// - Model read-back (intersections export, dimension hierarchy)
#[derive(Debug, Clone)]
pub struct EtlClient {
    /// Connection settings, fixed at construction
    config: ClientConfig,
    /// HTTP client instance
    client: Client,
    /// Timing used when monitoring implicitly started jobs
    monitor_schedule: PollSchedule,
    /// Cancels any wait in progress on this client or its clones
    cancel: CancellationToken,
}

impl EtlClient {
    /// Create a new ETL client
    ///
    /// # Arguments
    /// * `config` - Hub, credentials and template/model identifiers
    ///
    /// # Example
    /// ```
    /// use vepi_client::{ClientConfig, EtlClient};
    ///
    /// let config = ClientConfig::new("us1", "user", "key", "template");
    /// let client = EtlClient::new(config).unwrap();
    /// assert_eq!(client.base_url(), "https://us1.vena.io/api/public/v1");
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_http_client(config, Client::new())
    }

    /// Create a new ETL client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_http_client(config: ClientConfig, client: Client) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            monitor_schedule: PollSchedule::unbounded(),
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the timing used by [`EtlClient::monitor_job`]
    pub fn with_monitor_schedule(mut self, schedule: PollSchedule) -> Self {
        self.monitor_schedule = schedule;
        self
    }

    /// Share an externally owned cancellation token
    ///
    /// Cancelling it interrupts any poll in progress with
    /// [`EtlError::Cancelled`].
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that abandons waits on this client when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get the API root
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =============================================================================
    // URLs
    // =============================================================================

    fn template_url(&self, action: &str) -> String {
        format!(
            "{}/etl/templates/{}/{}",
            self.config.base_url, self.config.template_id, action
        )
    }

    fn job_url(&self, job_id: &str) -> String {
        format!("{}/etl/jobs/{}", self.config.base_url, job_id)
    }

    fn model_url(&self, model_id: &str, resource: &str) -> String {
        format!("{}/models/{}/{}", self.config.base_url, model_id, resource)
    }

    // =============================================================================
    // Request Execution
    // =============================================================================

    /// Authenticate, send and fully read a request
    async fn send(&self, request: RequestBuilder) -> std::result::Result<ApiResponse, reqwest::Error> {
        let response = request
            .basic_auth(&self.config.api_user, Some(&self.config.api_key))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        debug!("{} {}", response.status(), response.url());

        ApiResponse::read(response).await
    }

    /// Send a read-back request and deserialize its JSON body
    ///
    /// Non-2xx responses become [`EtlError::Api`] carrying the server detail.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = self.send(request).await?;

        if !response.is_success() {
            return Err(EtlError::Api {
                status: response.status.as_u16(),
                message: response.detail(),
            });
        }

        response.decode(what)
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// A response whose body has been read in full
#[derive(Debug)]
pub(crate) struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    async fn read(response: reqwest::Response) -> std::result::Result<Self, reqwest::Error> {
        let status = response.status();
        let body = response.text().await?;
        Ok(Self { status, body })
    }

    fn is_success(&self) -> bool {
        self.status.is_success()
    }

    fn status_code(&self) -> Option<u16> {
        Some(self.status.as_u16())
    }

    /// Server-provided detail: compact JSON when the body parses, raw text otherwise
    fn detail(&self) -> String {
        if self.body.trim().is_empty() {
            return self
                .status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string();
        }

        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(value) => value.to_string(),
            Err(_) => self.body.clone(),
        }
    }

    /// Deserialize the body, treating a mismatch as a protocol error
    fn decode<T: DeserializeOwned>(&self, what: &str) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| EtlError::Protocol(format!("Failed to parse {}: {}", what, e)))
    }
}
