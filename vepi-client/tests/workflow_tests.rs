//! Integration tests for the end-to-end workflows
//!
//! Exercises import, process and run flows against a mock ETL API, including
//! the terminal failure, deadline and cancellation paths of the poller.

mod common;

use std::time::Duration;

use common::{TEMPLATE_ID, client_for, requests_to};
use serde_json::json;
use vepi_client::{EtlError, JobStatus};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const FAST_INTERVAL: Duration = Duration::from_millis(10);
const GENEROUS_TIMEOUT: Duration = Duration::from_secs(5);

async fn mount_inline_start(server: &MockServer, job_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/etl/templates/{}/startWithData", TEMPLATE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": job_id})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_job_record(
    server: &MockServer,
    job_id: &str,
    body: serde_json::Value,
    times: Option<u64>,
) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/etl/jobs/{}", job_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));

    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

fn sample_rows() -> Vec<Vec<serde_json::Value>> {
    vec![
        vec![json!("4000"), json!("Jan"), json!(1250.0)],
        vec![json!("4100"), json!("Jan"), json!(-75.5)],
    ]
}

#[tokio::test]
async fn test_run_job_walks_full_lifecycle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/etl/templates/{}/jobs", TEMPLATE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-9"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/etl/jobs/job-9/submit"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "job-9", "status": "PENDING"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_job_record(&server, "job-9", json!({"id": "job-9", "status": "EDITING"}), Some(1)).await;
    mount_job_record(&server, "job-9", json!({"id": "job-9", "status": "RUNNING"}), Some(1)).await;
    mount_job_record(
        &server,
        "job-9",
        json!({
            "id": "job-9",
            "status": "COMPLETED",
            "warnings": ["2 rows skipped", "Member 'Old' is deprecated"]
        }),
        None,
    )
    .await;

    let client = client_for(&server);
    let job = client.run_job(FAST_INTERVAL, GENEROUS_TIMEOUT).await.unwrap();

    assert_eq!(job.status, Some(JobStatus::Completed));
    assert_eq!(job.warnings(), ["2 rows skipped", "Member 'Old' is deprecated"]);
    // Initial status, one RUNNING check and the final check
    assert_eq!(requests_to(&server, "/etl/jobs/job-9").await, 3);
}

#[tokio::test]
async fn test_process_data_submits_and_waits() {
    let server = MockServer::start().await;
    mount_inline_start(&server, "job-5").await;

    Mock::given(method("POST"))
        .and(path("/etl/jobs/job-5/submit"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "job-5", "status": "PENDING"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_job_record(&server, "job-5", json!({"id": "job-5", "status": "RUNNING"}), Some(2)).await;
    mount_job_record(&server, "job-5", json!({"id": "job-5", "status": "COMPLETED"}), None).await;

    let client = client_for(&server);
    let job = client
        .process_data(sample_rows(), FAST_INTERVAL, GENEROUS_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(job.id.as_deref(), Some("job-5"));
    assert_eq!(job.status, Some(JobStatus::Completed));
    assert_eq!(requests_to(&server, "/etl/jobs/job-5").await, 3);
}

#[tokio::test]
async fn test_process_data_failure_carries_record_error() {
    let server = MockServer::start().await;
    mount_inline_start(&server, "job-6").await;

    Mock::given(method("POST"))
        .and(path("/etl/jobs/job-6/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-6"})))
        .mount(&server)
        .await;

    mount_job_record(
        &server,
        "job-6",
        json!({"id": "job-6", "status": "FAILED", "error": "Row 3: unknown account 9999"}),
        None,
    )
    .await;

    let client = client_for(&server);
    let err = client
        .process_data(sample_rows(), FAST_INTERVAL, GENEROUS_TIMEOUT)
        .await
        .unwrap_err();

    match err {
        EtlError::JobFailed {
            job_id,
            status,
            detail,
        } => {
            assert_eq!(job_id, "job-6");
            assert_eq!(status, JobStatus::Failed);
            assert_eq!(detail.as_deref(), Some("Row 3: unknown account 9999"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(requests_to(&server, "/etl/jobs/job-6").await, 1);
}

#[tokio::test]
async fn test_wait_times_out_before_next_check() {
    let server = MockServer::start().await;
    mount_job_record(&server, "job-8", json!({"id": "job-8", "status": "RUNNING"}), None).await;

    let client = client_for(&server);
    let err = client
        .wait_for_job_completion("job-8", Duration::from_secs(10), Duration::from_millis(50))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(requests_to(&server, "/etl/jobs/job-8").await, 1);
}

#[tokio::test]
async fn test_import_rows_returns_once_completed() {
    let server = MockServer::start().await;
    mount_inline_start(&server, "job-1").await;

    Mock::given(method("GET"))
        .and(path("/etl/jobs/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("RUNNING")))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/etl/jobs/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("COMPLETED")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let job_id = client.import_rows(sample_rows()).await.unwrap();

    assert_eq!(job_id, "job-1");
    assert_eq!(requests_to(&server, "/etl/jobs/job-1/status").await, 3);
    // Success never needs the job-detail endpoint
    assert_eq!(requests_to(&server, "/etl/jobs/job-1").await, 0);
}

#[tokio::test]
async fn test_import_error_survives_failed_detail_fetch() {
    let server = MockServer::start().await;
    mount_inline_start(&server, "job-3").await;

    Mock::given(method("GET"))
        .and(path("/etl/jobs/job-3/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("ERROR")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/etl/jobs/job-3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.import_rows(sample_rows()).await.unwrap_err();

    match err {
        EtlError::JobFailed { status, detail, .. } => {
            assert_eq!(status, JobStatus::Error);
            assert!(detail.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(requests_to(&server, "/etl/jobs/job-3/status").await, 1);
}

#[tokio::test]
async fn test_import_error_includes_detail() {
    let server = MockServer::start().await;
    mount_inline_start(&server, "job-4").await;

    Mock::given(method("GET"))
        .and(path("/etl/jobs/job-4/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("ERROR")))
        .mount(&server)
        .await;

    mount_job_record(
        &server,
        "job-4",
        json!({"id": "job-4", "status": "ERROR", "message": "Mapping step failed"}),
        None,
    )
    .await;

    let client = client_for(&server);
    let err = client.import_rows(sample_rows()).await.unwrap_err();

    assert!(err.is_job_failure());
    assert!(err.to_string().ends_with(": Mapping step failed"));
}

#[tokio::test]
async fn test_status_check_failure_stops_monitoring() {
    let server = MockServer::start().await;
    mount_inline_start(&server, "job-2").await;

    Mock::given(method("GET"))
        .and(path("/etl/jobs/job-2/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.import_rows(sample_rows()).await.unwrap_err();

    match err {
        EtlError::Control {
            operation, status, ..
        } => {
            assert_eq!(operation, "check status");
            assert_eq!(status, Some(503));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(requests_to(&server, "/etl/jobs/job-2/status").await, 1);
}

#[tokio::test]
async fn test_cancelled_token_abandons_monitoring() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/etl/jobs/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("RUNNING")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.cancellation_token().cancel();

    let err = client.monitor_job("job-1").await.unwrap_err();

    assert!(matches!(err, EtlError::Cancelled { .. }));
    assert_eq!(requests_to(&server, "/etl/jobs/job-1/status").await, 0);
}
