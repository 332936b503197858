//! General integration tests.
//!
//! Tests for health check and test case listing/creation

use crate::common::{seeded_server, test_server};
use axum::http::StatusCode;

#[tokio::test]
async fn test_health_check() {
    let server = test_server();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_list_test_cases() {
    let (server, _gateway) = seeded_server();

    let response = server.get("/api/test-cases").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_create_test_case() {
    let server = test_server();

    let response = server
        .post("/api/test-cases")
        .json(&serde_json::json!({
            "title": "Password reset email",
            "type": "e2e",
            "priority": "high",
            "expected_result": "Email arrives within a minute"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let json: serde_json::Value = response.json();
    assert!(json["id"].as_str().unwrap().starts_with("tc-"));
    assert_eq!(json["status"], "todo");
    assert_eq!(json["type"], "e2e");
    assert_eq!(json["user_id"], "demo-user");
}

#[tokio::test]
async fn test_create_test_case_blank_title_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/api/test-cases")
        .json(&serde_json::json!({ "title": "   " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
