//! Shared helpers for client integration tests

#![allow(dead_code)]

use std::time::Duration;

use vepi_client::{ClientConfig, EtlClient, PollSchedule};
use wiremock::MockServer;

pub const TEMPLATE_ID: &str = "tmpl-1";
pub const MODEL_ID: &str = "model-1";
pub const API_USER: &str = "api-user";
pub const API_KEY: &str = "api-key";

/// Client pointed at the mock server with a fast monitor schedule
pub fn client_for(server: &MockServer) -> EtlClient {
    let config = ClientConfig::new("us1", API_USER, API_KEY, TEMPLATE_ID)
        .with_model_id(MODEL_ID)
        .with_base_url(server.uri());

    EtlClient::new(config)
        .expect("valid test config")
        .with_monitor_schedule(
            PollSchedule::unbounded()
                .with_initial_delay(Duration::from_millis(1))
                .with_interval(Duration::from_millis(5)),
        )
}

/// Number of requests the server received for `path`
pub async fn requests_to(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}
