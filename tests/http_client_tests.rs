//! Integration tests for the reqwest client using wiremock.
//!
//! These tests check the URL layout, headers and status pass-through of
//! `HttpClient`, then run a full sync against a mock emulator.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pubsub_emulator_sync::client::{HttpClient, ResourceClient};
use pubsub_emulator_sync::config::{Configuration, Project};
use pubsub_emulator_sync::reconcilers;
use pubsub_emulator_sync::resources::{schema, Schema, SchemaType, Subscription, Topic};
use reqwest::StatusCode;

// =============================================================================
// Test Helpers
// =============================================================================

async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(server.address().to_string())
}

// =============================================================================
// Transport Tests
// =============================================================================

#[tokio::test]
async fn test_paths_are_prefixed_with_api_version() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p/topics"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).get("projects/p/topics").await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&response.body).unwrap(),
        json!({ "topics": [] })
    );
}

#[tokio::test]
async fn test_error_statuses_are_responses() {
    let server = setup_mock_server().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/projects/p/topics/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .delete("projects/p/topics/gone")
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, b"Not found");
}

#[tokio::test]
async fn test_put_and_patch_send_body() {
    let server = setup_mock_server().await;

    Mock::given(method("PUT"))
        .and(path("/v1/projects/p/topics/t"))
        .and(body_json(json!({ "labels": { "team": "core" } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/v1/projects/p/subscriptions/s"))
        .and(body_json(json!({ "updateMask": "ackDeadlineSeconds" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let put = client
        .put("projects/p/topics/t", br#"{"labels":{"team":"core"}}"#.to_vec())
        .await
        .unwrap();
    let patch = client
        .patch(
            "projects/p/subscriptions/s",
            br#"{"updateMask":"ackDeadlineSeconds"}"#.to_vec(),
        )
        .await
        .unwrap();

    assert_eq!(put.status, StatusCode::OK);
    assert_eq!(patch.status, StatusCode::OK);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = HttpClient::new("127.0.0.1:1");

    let err = client.get("").await.unwrap_err();

    assert!(err.is_transport(), "expected transport error, got {:?}", err);
}

#[tokio::test]
async fn test_schema_create_uses_schema_id_query() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p/schemas/orders"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/p/schemas"))
        .and(query_param("schemaId", "orders"))
        .and(body_json(json!({
            "name": "projects/p/schemas/orders",
            "type": "PROTOCOL_BUFFER",
            "definition": "syntax = \"proto3\";"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let declared = Schema {
        name: "orders".to_string(),
        schema_type: SchemaType::ProtocolBuffer,
        definition: "syntax = \"proto3\";".to_string(),
        ..Default::default()
    };

    let created = schema::create_if_absent(&client_for(&server), "p", &declared)
        .await
        .unwrap();

    assert!(created);
}

// =============================================================================
// End-to-End Sync
// =============================================================================

#[tokio::test]
async fn test_sync_against_mock_emulator() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p/topics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "topics": [{ "name": "projects/p/topics/stale" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/projects/p/topics/stale"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p/subscriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p/topics/orders"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v1/projects/p/topics/orders"))
        .and(body_json(json!({ "messageRetentionDuration": "600s" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p/subscriptions/orders-sub"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v1/projects/p/subscriptions/orders-sub"))
        .and(body_json(json!({
            "topic": "projects/p/topics/orders",
            "ackDeadlineSeconds": 20
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = Configuration {
        host: server.address().to_string(),
        projects: vec![Project {
            name: "p".to_string(),
            topics: vec![Topic {
                name: "orders".to_string(),
                message_retention_duration: Some("600s".to_string()),
                subscriptions: vec![Subscription {
                    name: "orders-sub".to_string(),
                    ack_deadline_seconds: Some(20),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            schemas: Vec::new(),
        }],
        ..Default::default()
    };

    let report = reconcilers::sync(&config, &HttpClient::new(config.host.clone()))
        .await
        .unwrap();

    assert_eq!(report.topics_deleted, 1);
    assert_eq!(report.topics_created, 1);
    assert_eq!(report.subscriptions_created, 1);
}
