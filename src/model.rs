use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestCase {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub test_type: TestType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub actual_result: Option<String>,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Smoke,
    Regression,
    Integration,
    Unit,
    E2e,
    Functional,
    Whitebox,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Smoke => "smoke",
            TestType::Regression => "regression",
            TestType::Integration => "integration",
            TestType::Unit => "unit",
            TestType::E2e => "e2e",
            TestType::Functional => "functional",
            TestType::Whitebox => "whitebox",
            TestType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestType::Smoke => write!(f, "Smoke"),
            TestType::Regression => write!(f, "Regression"),
            TestType::Integration => write!(f, "Integration"),
            TestType::Unit => write!(f, "Unit"),
            TestType::E2e => write!(f, "E2E"),
            TestType::Functional => write!(f, "Functional"),
            TestType::Whitebox => write!(f, "Whitebox"),
            TestType::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Returns sort order (lower = more urgent)
    pub fn sort_order(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Todo,
    InProgress,
    Testing,
    Done,
    Failed,
    Blocked,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TestStatus {
    /// Workflow columns in board order; `Unknown` is not a workflow state.
    pub const WORKFLOW: [TestStatus; 6] = [
        TestStatus::Todo,
        TestStatus::InProgress,
        TestStatus::Testing,
        TestStatus::Done,
        TestStatus::Failed,
        TestStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Todo => "todo",
            TestStatus::InProgress => "in_progress",
            TestStatus::Testing => "testing",
            TestStatus::Done => "done",
            TestStatus::Failed => "failed",
            TestStatus::Blocked => "blocked",
            TestStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Todo => write!(f, "To Do"),
            TestStatus::InProgress => write!(f, "In Progress"),
            TestStatus::Testing => write!(f, "Testing"),
            TestStatus::Done => write!(f, "Done"),
            TestStatus::Failed => write!(f, "Failed"),
            TestStatus::Blocked => write!(f, "Blocked"),
            TestStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestExecution {
    pub id: String,
    pub test_case_id: String,
    pub status: Outcome,
    #[serde(with = "time::serde::rfc3339")]
    pub executed_at: OffsetDateTime,
    /// Seconds
    pub execution_time: f64,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        }
    }

    /// Status the owning test case moves to, `None` when it is left alone.
    pub fn resulting_status(&self) -> Option<TestStatus> {
        match self {
            Outcome::Passed => Some(TestStatus::Done),
            Outcome::Failed => Some(TestStatus::Failed),
            Outcome::Skipped => None,
        }
    }
}

impl FromStr for Outcome {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Outcome::Passed),
            "failed" => Ok(Outcome::Failed),
            "skipped" => Ok(Outcome::Skipped),
            other => Err(AppError::Validation(format!(
                "unknown execution outcome '{}' (expected passed, failed or skipped)",
                other
            ))),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Integration {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub provider: ProviderKind,
    #[serde(default)]
    pub config: ConfigMap,
    pub status: IntegrationStatus,
    pub user_id: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_sync_at: Option<OffsetDateTime>,
}

impl Integration {
    pub fn is_active(&self) -> bool {
        self.status == IntegrationStatus::Active
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Jira,
    Trello,
    Slack,
    Testrail,
    Github,
    Gitlab,
    Jenkins,
    #[serde(other)]
    Other,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Jira => write!(f, "Jira"),
            ProviderKind::Trello => write!(f, "Trello"),
            ProviderKind::Slack => write!(f, "Slack"),
            ProviderKind::Testrail => write!(f, "TestRail"),
            ProviderKind::Github => write!(f, "GitHub"),
            ProviderKind::Gitlab => write!(f, "GitLab"),
            ProviderKind::Jenkins => write!(f, "Jenkins"),
            ProviderKind::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IntegrationSyncAttempt {
    pub id: String,
    pub integration_id: String,
    pub sync_status: SyncStatus,
    pub items_synced: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    InProgress,
    Success,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Report {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub date_from: Date,
    pub date_to: Date,
    pub status: ReportStatus,
    pub user_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    Generating,
    Failed,
}

// Insert and update payloads. The gateway fills in ids and timestamps.

#[derive(Debug, Deserialize, Clone)]
pub struct TestCaseCreate {
    pub title: String,
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub test_type: TestType,
    #[serde(default)]
    pub priority: Priority,
    pub status: Option<TestStatus>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    /// Filled from configuration when absent
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TestCaseUpdate {
    pub status: Option<TestStatus>,
    pub actual_result: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewExecution {
    pub test_case_id: String,
    pub status: Outcome,
    pub execution_time: f64,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSyncAttempt {
    pub integration_id: String,
}

#[derive(Debug, Clone)]
pub struct SyncAttemptUpdate {
    pub sync_status: SyncStatus,
    pub items_synced: usize,
    pub completed_at: OffsetDateTime,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub name: String,
    pub report_type: String,
    pub date_from: Date,
    pub date_to: Date,
    pub status: ReportStatus,
    pub user_id: String,
    pub description: Option<String>,
}
