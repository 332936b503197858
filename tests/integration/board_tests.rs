//! Board integration tests.

use crate::common::{seeded_server, test_server};
use axum::http::StatusCode;

#[tokio::test]
async fn test_board_has_workflow_columns() {
    let server = test_server();

    let response = server.get("/api/board").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json: serde_json::Value = response.json();
    let statuses: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["status"].as_str().unwrap())
        .collect();
    assert_eq!(
        statuses,
        vec!["todo", "in_progress", "testing", "done", "failed", "blocked"]
    );
}

#[tokio::test]
async fn test_board_orders_cards_by_priority() {
    let (server, _gateway) = seeded_server();

    let json: serde_json::Value = server.get("/api/board").await.json();
    let todo = &json[0]["test_cases"];

    assert_eq!(todo.as_array().unwrap().len(), 2);
    // critical before medium
    assert_eq!(todo[0]["id"], "tc-1");
    assert_eq!(todo[1]["id"], "tc-5");
}

#[tokio::test]
async fn test_board_moves_card_after_execution() {
    let (server, _gateway) = seeded_server();

    server
        .post("/api/test-cases/tc-5/executions")
        .json(&serde_json::json!({ "outcome": "failed", "execution_time": 3.0 }))
        .await;

    let json: serde_json::Value = server.get("/api/board").await.json();
    let failed: Vec<&str> = json[4]["test_cases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert!(failed.contains(&"tc-5"));
    assert_eq!(json[0]["test_cases"].as_array().unwrap().len(), 1);
}
