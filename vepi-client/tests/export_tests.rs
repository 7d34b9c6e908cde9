//! Integration tests for the model read-back endpoints

mod common;

use common::{API_KEY, API_USER, MODEL_ID, TEMPLATE_ID, client_for};
use serde_json::json;
use vepi_client::{ClientConfig, DEFAULT_PAGE_SIZE, EtlClient, EtlError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{basic_auth, method, path, query_param},
};

fn intersections_path() -> String {
    format!("/models/{}/intersections", MODEL_ID)
}

#[tokio::test]
async fn test_export_follows_next_page() {
    let server = MockServer::start().await;
    let next_page = format!("{}{}?cursor=page-2", server.uri(), intersections_path());

    Mock::given(method("GET"))
        .and(path(intersections_path()))
        .and(query_param("cursor", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                ["Account", "Period", "Value"],
                ["4200", "Feb", 10],
            ],
            "metadata": {"headers": ["Account", "Period", "Value"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(intersections_path()))
        .and(query_param("pageSize", "2"))
        .and(basic_auth(API_USER, API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                ["Acct", "Per", "Val"],
                ["4000", "Jan", 1250],
                ["4100", "Jan", -75],
            ],
            "metadata": {"headers": ["Acct", "Per", "Val"], "nextPage": next_page}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let table = client.export_intersections(2).await.unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.headers, ["Account", "Period", "Value"]);
    assert_eq!(table.rows[0], vec![json!("4000"), json!("Jan"), json!(1250)]);
    assert_eq!(table.rows[2], vec![json!("4200"), json!("Feb"), json!(10)]);
    assert_eq!(table.column("Value"), Some(2));
}

#[tokio::test]
async fn test_export_single_page_with_empty_next_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(intersections_path()))
        .and(query_param("pageSize", DEFAULT_PAGE_SIZE.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [["Account", "Value"], ["4000", 1]],
            "metadata": {"headers": ["Account", "Value"], "nextPage": ""}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let table = client.export_intersections(DEFAULT_PAGE_SIZE).await.unwrap();

    assert_eq!(table.len(), 1);
}

#[tokio::test]
async fn test_export_without_model_makes_no_request() {
    let server = MockServer::start().await;
    let config = ClientConfig::new("us1", API_USER, API_KEY, TEMPLATE_ID).with_base_url(server.uri());
    let client = EtlClient::new(config).unwrap();

    let err = client.export_intersections(DEFAULT_PAGE_SIZE).await.unwrap_err();
    assert!(err.is_validation());

    let err = client.get_dimension_hierarchy().await.unwrap_err();
    assert!(err.is_validation());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_export_page_error_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(intersections_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("export unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.export_intersections(10).await.unwrap_err();

    match err {
        EtlError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "export unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_dimension_hierarchy_decodes_members() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/models/{}/hierarchy", MODEL_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"dimension": "Account", "name": "Revenue", "parent": "Net Income", "operator": "+"},
                {"dimension": "Account", "name": "4000", "alias": "Sales", "parent": "Revenue"},
                {"dimension": "Period", "name": "Jan", "parent": "Q1"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let members = client.get_dimension_hierarchy().await.unwrap();

    assert_eq!(members.len(), 3);
    assert_eq!(members[1].alias.as_deref(), Some("Sales"));
    assert_eq!(members[0].operator.as_deref(), Some("+"));
    assert_eq!(members[2].dimension.as_deref(), Some("Period"));
}
