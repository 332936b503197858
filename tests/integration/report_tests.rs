//! Report integration tests.
//!
//! Tests for POST/GET /api/reports

use crate::common::{seeded_server, test_server};
use axum::http::StatusCode;

#[tokio::test]
async fn test_generate_report_for_empty_window() {
    let server = test_server();

    let response = server
        .post("/api/reports")
        .json(&serde_json::json!({
            "type": "test_summary",
            "date_from": "2024-01-01",
            "date_to": "2024-01-31"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["report"]["name"], "Test Summary Report 2024-01-01 - 2024-01-31");
    assert_eq!(json["report"]["type"], "test_summary");
    assert_eq!(json["report"]["status"], "completed");
    assert_eq!(json["report"]["user_id"], "demo-user");
    assert_eq!(json["report"]["date_from"], "2024-01-01");
    assert_eq!(json["metrics"]["total_tests"], 0);
    assert_eq!(json["metrics"]["pass_rate"], 0.0);
}

#[tokio::test]
async fn test_inverted_range_stores_nothing() {
    let (server, gateway) = seeded_server();

    let response = server
        .post("/api/reports")
        .json(&serde_json::json!({
            "type": "test_summary",
            "date_from": "2024-02-01",
            "date_to": "2024-01-01"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(gateway.snapshot().await.reports.is_empty());
}

#[tokio::test]
async fn test_blank_report_type_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/api/reports")
        .json(&serde_json::json!({
            "type": " ",
            "date_from": "2024-01-01",
            "date_to": "2024-01-31"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_reports() {
    let server = test_server();

    for report_type in ["test_summary", "execution"] {
        server
            .post("/api/reports")
            .json(&serde_json::json!({
                "type": report_type,
                "date_from": "2024-01-01",
                "date_to": "2024-01-07"
            }))
            .await;
    }

    let response = server.get("/api/reports").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let json: serde_json::Value = response.json();
    assert_eq!(json.as_array().unwrap().len(), 2);
}
