//! BigQuery adapter tests against a mocked API server

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mongodb::bson::doc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mbq_etl::bigquery::{
    raw_document_schema, BigQueryClient, TableReference, WarehouseSink,
};
use mbq_etl::config::BigQueryConfig;
use mbq_etl::record::normalize;

fn test_client(server: &MockServer) -> BigQueryClient {
    let config = BigQueryConfig {
        endpoint: server.uri(),
        access_token: "test-token".to_string(),
    };
    BigQueryClient::new(&config).unwrap()
}

fn test_table() -> TableReference {
    TableReference {
        project_id: "proj".to_string(),
        dataset_id: "ds".to_string(),
        table_id: "tbl_one".to_string(),
    }
}

#[tokio::test]
async fn prepare_table_creates_missing_table() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/proj/datasets/ds/tables"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .prepare_table(&test_table(), &raw_document_schema())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["tableReference"]["tableId"], "tbl_one");
    assert_eq!(body["schema"]["fields"][0]["name"], "id");
    assert_eq!(body["schema"]["fields"][2]["type"], "TIMESTAMP");
}

#[tokio::test]
async fn prepare_table_tolerates_existing_table() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/proj/datasets/ds/tables"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error": { "message": "Already Exists: Table proj:ds.tbl_one" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client
        .prepare_table(&test_table(), &raw_document_schema())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn prepare_table_surfaces_api_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/proj/datasets/ds/tables"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client
        .prepare_table(&test_table(), &raw_document_schema())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn append_rows_posts_normalized_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/projects/proj/datasets/ds/tables/tbl_one/insertAll",
        ))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "bigquery#tableDataInsertAllResponse"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rows = vec![
        normalize(&doc! { "_id": "doc-1", "v": 1_i32 }).unwrap(),
        normalize(&doc! { "_id": "doc-2", "v": 2_i32 }).unwrap(),
    ];

    let client = test_client(&server);
    client.append_rows(&test_table(), &rows).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let sent = body["rows"].as_array().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["json"]["id"], "doc-1");
    assert_eq!(sent[0]["json"]["op"], 1);
    assert!(sent[0]["json"]["clusterTime"].is_string());
    assert!(sent[1]["json"]["raw"].as_str().unwrap().contains("doc-2"));
}

#[tokio::test]
async fn append_rows_surfaces_insert_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/projects/proj/datasets/ds/tables/tbl_one/insertAll",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "insertErrors": [
                { "index": 0, "errors": [{ "reason": "invalid", "message": "bad row" }] }
            ]
        })))
        .mount(&server)
        .await;

    let rows = vec![normalize(&doc! { "_id": "doc-1" }).unwrap()];

    let client = test_client(&server);
    let result = client.append_rows(&test_table(), &rows).await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("bad row"), "got: {}", message);
}

#[tokio::test]
async fn append_rows_skips_empty_batches() {
    let server = MockServer::start().await;

    let client = test_client(&server);
    client.append_rows(&test_table(), &[]).await.unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}
