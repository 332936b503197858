//! Integration sync tests.
//!
//! Tests for POST /api/integrations/:id/sync and the attempt history

use crate::common::{create_test_cases, seeded_server};
use axum::http::StatusCode;
use testdeck::Gateway;

#[tokio::test]
async fn test_jira_sync_is_capped_at_batch_limit() {
    let (server, gateway) = seeded_server();
    create_test_cases(&server, 10).await;

    let response = server.post("/api/integrations/int-jira/sync").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["synced_count"], 10);
    assert_eq!(json["message"], "Synced 10 test cases to Jira project QA");
    assert!(json.get("error").is_none());

    let integration = gateway.get_integration("int-jira").await.unwrap();
    assert!(integration.last_sync_at.is_some());
}

#[tokio::test]
async fn test_trello_sync_is_capped_at_eight() {
    let (server, _gateway) = seeded_server();
    create_test_cases(&server, 10).await;

    let json: serde_json::Value = server
        .post("/api/integrations/int-trello/sync")
        .await
        .json();

    assert_eq!(json["success"], true);
    assert_eq!(json["synced_count"], 8);
}

#[tokio::test]
async fn test_slack_sync_counts_one_summary() {
    let (server, _gateway) = seeded_server();

    let json: serde_json::Value = server
        .post("/api/integrations/int-slack/sync")
        .await
        .json();

    assert_eq!(json["success"], true);
    assert_eq!(json["synced_count"], 1);
    assert_eq!(json["message"], "Sent test summary to Slack channel #qa");
}

#[tokio::test]
async fn test_sync_selected_test_cases() {
    let (server, _gateway) = seeded_server();

    let json: serde_json::Value = server
        .post("/api/integrations/int-jira/sync")
        .json(&serde_json::json!({ "test_case_ids": ["tc-1", "tc-3"] }))
        .await
        .json();

    assert_eq!(json["synced_count"], 2);

    let response = server
        .post("/api/integrations/int-jira/sync")
        .json(&serde_json::json!({ "test_case_ids": ["tc-ghost"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsupported_provider_fails_and_is_recorded() {
    let (server, gateway) = seeded_server();

    let response = server.post("/api/integrations/int-testrail/sync").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json["success"], false);
    assert_eq!(json["synced_count"], 0);
    assert_eq!(json["error"], "Unsupported provider");

    let attempts = gateway.list_sync_attempts("int-testrail").await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].sync_status, testdeck::model::SyncStatus::Failed);
    assert_eq!(attempts[0].error_message.as_deref(), Some("Unsupported provider"));
    assert!(attempts[0].completed_at.is_some());
}

#[tokio::test]
async fn test_inactive_integration_fails() {
    let (server, _gateway) = seeded_server();

    let json: serde_json::Value = server
        .post("/api/integrations/int-off/sync")
        .await
        .json();

    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Integration is inactive");
}

#[tokio::test]
async fn test_unknown_integration_writes_nothing() {
    let (server, gateway) = seeded_server();

    let response = server.post("/api/integrations/int-ghost/sync").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(gateway.snapshot().await.integration_syncs.is_empty());
}

#[tokio::test]
async fn test_sync_history_lists_every_attempt() {
    let (server, _gateway) = seeded_server();

    server.post("/api/integrations/int-slack/sync").await;
    server.post("/api/integrations/int-slack/sync").await;

    let response = server.get("/api/integrations/int-slack/syncs").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let json: serde_json::Value = response.json();
    let attempts = json.as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert!(attempts.iter().all(|a| a["sync_status"] == "success"));
    assert!(attempts.iter().all(|a| a["items_synced"] == 1));

    let response = server.get("/api/integrations/int-ghost/syncs").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_sync_body_is_bad_request() {
    let (server, gateway) = seeded_server();

    let response = server
        .post("/api/integrations/int-trello/sync")
        .json(&serde_json::json!({ "test_case_ids": "tc-1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/integrations/int-trello/sync")
        .text("tc-1")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    assert!(gateway.snapshot().await.integration_syncs.is_empty());
}
