//! Job status poller
//!
//! Repeatedly asks a [`StatusSource`] for a job's status until the job reaches
//! a terminal state, the optional deadline passes, or the wait is cancelled.
//!
//! State machine, per job:
//! - started: wait `initial_delay`
//! - checking: one status request
//!   - `COMPLETED` → success, return the observation
//!   - `ERROR` / `CANCELLED` / `FAILED` → fetch failure detail (best effort),
//!     return [`EtlError::JobFailed`]
//!   - anything else → log, wait `interval`, check again
//!
//! A failed status request ends the wait immediately and is never retried.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use vepi_core::domain::job::{JobDetails, JobStatus, StatusClass};

use crate::EtlClient;
use crate::error::{EtlError, Result};

/// Default delay before the first check on the monitoring path
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Default delay between checks on the monitoring path
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Conventional poll interval for [`EtlClient::wait_for_job_completion`]
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(5);

/// Conventional deadline for [`EtlClient::wait_for_job_completion`]
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Wake-up used when an interval is too large to represent as an instant
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Timing of a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Wait before the first check
    pub initial_delay: Duration,
    /// Wait between consecutive checks
    pub interval: Duration,
    /// Give up after this long; `None` polls until a terminal state
    pub timeout: Option<Duration>,
}

impl PollSchedule {
    /// 1s before the first check, then every 3s, with no deadline
    pub fn unbounded() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: DEFAULT_INTERVAL,
            timeout: None,
        }
    }

    /// Check immediately, then every `interval`, until `timeout` has elapsed
    pub fn bounded(interval: Duration, timeout: Duration) -> Self {
        Self {
            initial_delay: Duration::ZERO,
            interval,
            timeout: Some(timeout),
        }
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A status observed by one check, with whatever the source returned alongside
#[derive(Debug, Clone)]
pub struct Observation<R> {
    pub status: JobStatus,
    pub report: R,
}

/// Where the poller reads job status from
///
/// The ETL API exposes status twice, in different shapes; each shape is one
/// implementation with its own decode step.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Extra data returned with each status
    type Report: Send + Sync;

    /// Issue one status request
    async fn check(&self, job_id: &str) -> Result<Observation<Self::Report>>;

    /// Extended error detail for a job that ended in failure
    ///
    /// Called at most once per wait. Its errors are logged and dropped by the
    /// poller; they never replace the job failure being reported.
    async fn failure_detail(&self, job_id: &str, report: &Self::Report) -> Result<Option<String>>;
}

// =============================================================================
// Status Sources
// =============================================================================

/// Bare status string from `GET /etl/jobs/{id}/status`
///
/// On failure, detail comes from a separate job-detail request.
pub struct BareStatus<'a> {
    client: &'a EtlClient,
}

impl<'a> BareStatus<'a> {
    pub fn new(client: &'a EtlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for BareStatus<'_> {
    type Report = ();

    async fn check(&self, job_id: &str) -> Result<Observation<()>> {
        let status = self.client.check_job_status(job_id).await?;
        Ok(Observation { status, report: () })
    }

    async fn failure_detail(&self, job_id: &str, _report: &()) -> Result<Option<String>> {
        let response = self
            .client
            .send(self.client.client.get(self.client.job_url(job_id)))
            .await
            .map_err(|e| EtlError::control_transport("get error detail for", job_id, e))?;

        if !response.is_success() {
            return Err(EtlError::Control {
                operation: "get error detail for",
                job_id: job_id.to_string(),
                status: response.status_code(),
                message: response.detail(),
            });
        }

        Ok(extract_failure_detail(&response.body))
    }
}

/// Structured job record from `GET /etl/jobs/{id}`
///
/// The record already carries any error text, so no extra request is made.
pub struct JobDetailStatus<'a> {
    client: &'a EtlClient,
}

impl<'a> JobDetailStatus<'a> {
    pub fn new(client: &'a EtlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for JobDetailStatus<'_> {
    type Report = JobDetails;

    async fn check(&self, job_id: &str) -> Result<Observation<JobDetails>> {
        let job = self.client.get_job_status(job_id).await?;
        let status = job.status.clone().ok_or_else(|| {
            EtlError::Protocol(format!("Job {} status response has no status field", job_id))
        })?;
        Ok(Observation { status, report: job })
    }

    async fn failure_detail(&self, _job_id: &str, report: &JobDetails) -> Result<Option<String>> {
        Ok(report.failure_detail())
    }
}

/// Pull a readable failure description out of a job-detail body
///
/// Prefers `error`, then `message`, then the whole object; a body that is not
/// JSON is returned as-is.
fn extract_failure_detail(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let value = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value,
        Err(_) => return Some(body.to_string()),
    };

    let field = |name: &str| match value.get(name) {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    };

    field("error")
        .or_else(|| field("message"))
        .or_else(|| value.is_object().then(|| value.to_string()))
}

// =============================================================================
// Poll Loop
// =============================================================================

/// Poll `source` until the job reaches a terminal state
///
/// # Returns
/// The observation that reported `COMPLETED`
///
/// # Errors
/// - [`EtlError::JobFailed`] on `ERROR`, `CANCELLED` or `FAILED`
/// - [`EtlError::Timeout`] when waking for the next check would pass the deadline
/// - [`EtlError::Cancelled`] when `cancel` fires during a check, a detail fetch or a wait
/// - any error from the status request itself, unchanged
pub async fn poll_job<S: StatusSource>(
    source: &S,
    job_id: &str,
    schedule: &PollSchedule,
    cancel: &CancellationToken,
) -> Result<Observation<S::Report>> {
    // A timeout too large to represent never expires
    let deadline = schedule
        .timeout
        .and_then(|timeout| Instant::now().checked_add(timeout));

    if !schedule.initial_delay.is_zero() {
        pause(job_id, schedule.initial_delay, deadline, schedule, cancel).await?;
    }

    loop {
        let checked = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(job_id)),
            checked = source.check(job_id) => checked,
        };

        let observation = match checked {
            Ok(observation) => observation,
            Err(e) => {
                error!("Error checking status of job {}: {}", job_id, e);
                return Err(e);
            }
        };

        match observation.status.class() {
            StatusClass::Succeeded => {
                info!("Job {} completed successfully", job_id);
                return Ok(observation);
            }
            StatusClass::Failed => {
                let fetched = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(cancelled(job_id)),
                    fetched = source.failure_detail(job_id, &observation.report) => fetched,
                };

                let detail = match fetched {
                    Ok(detail) => detail,
                    Err(e) => {
                        warn!("Could not fetch error details for job {}: {}", job_id, e);
                        None
                    }
                };

                let err = EtlError::JobFailed {
                    job_id: job_id.to_string(),
                    status: observation.status,
                    detail,
                };
                error!("{}", err);
                return Err(err);
            }
            StatusClass::Pending => {
                info!("Job {} status: {}", job_id, observation.status);
            }
        }

        pause(job_id, schedule.interval, deadline, schedule, cancel).await?;
    }
}

/// Sleep for `delay`, or only until the deadline if that comes first
///
/// Reaching the deadline ends the wait with a timeout: no check is made at
/// or after the deadline unless one was already due before it.
async fn pause(
    job_id: &str,
    delay: Duration,
    deadline: Option<Instant>,
    schedule: &PollSchedule,
    cancel: &CancellationToken,
) -> Result<()> {
    let now = Instant::now();
    let (until, expires) = match (now.checked_add(delay), deadline) {
        (Some(wake), Some(deadline)) if wake > deadline => (deadline, true),
        (None, Some(deadline)) => (deadline, true),
        (Some(wake), _) => (wake, false),
        (None, None) => (now + FAR_FUTURE, false),
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(cancelled(job_id)),
        _ = sleep_until(until) => {}
    }

    if expires {
        let timeout = schedule.timeout.unwrap_or_default();
        warn!("Job {} did not complete within {:?}", job_id, timeout);
        return Err(EtlError::Timeout {
            job_id: job_id.to_string(),
            timeout,
        });
    }

    Ok(())
}

fn cancelled(job_id: &str) -> EtlError {
    warn!("Stopped waiting for job {}", job_id);
    EtlError::Cancelled {
        job_id: job_id.to_string(),
    }
}

impl EtlClient {
    // =============================================================================
    // Waiting
    // =============================================================================

    /// Monitor a started job through the bare status endpoint
    ///
    /// Uses the client's monitor schedule (by default 1s, then every 3s, with
    /// no deadline): a job that never finishes is polled until the client's
    /// cancellation token fires.
    ///
    /// # Returns
    /// The terminal status, always `COMPLETED`
    pub async fn monitor_job(&self, job_id: &str) -> Result<JobStatus> {
        let source = BareStatus::new(self);
        let observation = poll_job(&source, job_id, &self.monitor_schedule, &self.cancel).await?;
        Ok(observation.status)
    }

    /// Wait for a job through the job-detail endpoint, with a deadline
    ///
    /// # Arguments
    /// * `job_id` - The job to wait for
    /// * `poll_interval` - Delay between checks
    /// * `timeout` - Maximum time to wait before failing with [`EtlError::Timeout`]
    ///
    /// # Returns
    /// The final job record
    pub async fn wait_for_job_completion(
        &self,
        job_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<JobDetails> {
        let source = JobDetailStatus::new(self);
        let schedule = PollSchedule::bounded(poll_interval, timeout);
        let observation = poll_job(&source, job_id, &schedule, &self.cancel).await?;
        Ok(observation.report)
    }
}
