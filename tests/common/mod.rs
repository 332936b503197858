//! Shared test utilities for integration tests.
//!
//! Servers are backed by an in-memory store seeded with a small fixture set,
//! and the store handle is returned so tests can check what was persisted.

use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;
use testdeck::model::{Integration, Priority, TestCase, TestStatus, TestType};
use testdeck::{AppState, Config, Dashboard, MemoryGateway, Snapshot, create_app};
use time::OffsetDateTime;

/// Creates a test server over an empty store.
pub fn test_server() -> TestServer {
    let (server, _gateway) = server_with(Snapshot::default());
    server
}

/// Creates a test server over the fixture store.
pub fn seeded_server() -> (TestServer, Arc<MemoryGateway>) {
    server_with(fixtures())
}

pub fn server_with(snapshot: Snapshot) -> (TestServer, Arc<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::from_snapshot(snapshot));
    let dashboard = Dashboard::new(gateway.clone(), Config::default());
    let app = create_app(Arc::new(AppState::new(dashboard)));
    let server = TestServer::new(app).unwrap();
    (server, gateway)
}

/// Builds a test case row with the given id.
pub fn test_case(id: &str, test_type: TestType, priority: Priority, status: TestStatus) -> TestCase {
    let now = OffsetDateTime::now_utc();
    TestCase {
        id: id.to_string(),
        title: format!("Test case {}", id),
        description: Some("Seeded fixture".to_string()),
        test_type,
        priority,
        status,
        steps: None,
        expected_result: None,
        actual_result: None,
        user_id: "demo-user".to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn integration(id: &str, provider: &str, status: &str) -> Integration {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("{} integration", provider),
        "provider": provider,
        "config": { "project_key": "QA", "channel": "#qa" },
        "status": status,
        "user_id": "demo-user",
    }))
    .unwrap()
}

/// Five test cases and one integration per interesting provider.
///
/// Test cases: tc-1 todo, tc-2 in_progress, tc-3 done, tc-4 failed, tc-5 todo.
/// Integrations: int-jira, int-trello, int-slack, int-testrail (unsupported),
/// int-off (inactive jira).
pub fn fixtures() -> Snapshot {
    Snapshot {
        test_cases: vec![
            test_case("tc-1", TestType::Smoke, Priority::Critical, TestStatus::Todo),
            test_case("tc-2", TestType::Regression, Priority::High, TestStatus::InProgress),
            test_case("tc-3", TestType::Unit, Priority::Medium, TestStatus::Done),
            test_case("tc-4", TestType::E2e, Priority::Low, TestStatus::Failed),
            test_case("tc-5", TestType::Smoke, Priority::Medium, TestStatus::Todo),
        ],
        integrations: vec![
            integration("int-jira", "jira", "active"),
            integration("int-trello", "trello", "active"),
            integration("int-slack", "slack", "active"),
            integration("int-testrail", "testrail", "active"),
            integration("int-off", "jira", "inactive"),
        ],
        ..Snapshot::default()
    }
}

/// Creates `count` extra test cases through the API.
pub async fn create_test_cases(server: &TestServer, count: usize) {
    for i in 0..count {
        let response = server
            .post("/api/test-cases")
            .json(&json!({ "title": format!("Bulk case {}", i), "type": "functional" }))
            .await;
        assert_eq!(response.status_code(), axum::http::StatusCode::CREATED);
    }
}
