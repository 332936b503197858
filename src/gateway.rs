//! Persistence gateway: the relational store the core reads from and writes to.
//!
//! The store itself is a collaborator. The core only depends on the filtered
//! read, insert and update capabilities of [`Gateway`], one group per table.

pub mod memory;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::model::{
    Integration, IntegrationSyncAttempt, NewExecution, NewReport, NewSyncAttempt, Report,
    SyncAttemptUpdate, TestCase, TestCaseCreate, TestCaseUpdate, TestExecution,
};

pub use memory::{MemoryGateway, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    TestCases,
    TestExecutions,
    Integrations,
    IntegrationSyncs,
    Reports,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::TestCases => "test_cases",
            Table::TestExecutions => "test_executions",
            Table::Integrations => "integrations",
            Table::IntegrationSyncs => "integration_syncs",
            Table::Reports => "reports",
        }
    }

    /// Human readable name of a single row
    pub fn entity_name(&self) -> &'static str {
        match self {
            Table::TestCases => "Test case",
            Table::TestExecutions => "Test execution",
            Table::Integrations => "Integration",
            Table::IntegrationSyncs => "Integration sync",
            Table::Reports => "Report",
        }
    }

    /// Prefix for generated row ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Table::TestCases => "tc",
            Table::TestExecutions => "exe",
            Table::Integrations => "int",
            Table::IntegrationSyncs => "sync",
            Table::Reports => "rpt",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{} {id} not found in {table}", .table.entity_name())]
    NotFound { table: Table, id: String },

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse stored data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Filter for execution reads. Date bounds are inclusive calendar dates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExecutionFilter {
    pub test_case_id: Option<String>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl ExecutionFilter {
    pub fn for_test_case(id: impl Into<String>) -> Self {
        Self {
            test_case_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn between(from: Date, to: Date) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn matches(&self, execution: &TestExecution) -> bool {
        if let Some(id) = &self.test_case_id
            && &execution.test_case_id != id
        {
            return false;
        }
        let day = execution.executed_at.date();
        if let Some(from) = self.from
            && day < from
        {
            return false;
        }
        if let Some(to) = self.to
            && day > to
        {
            return false;
        }
        true
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_test_cases(&self) -> Result<Vec<TestCase>>;
    async fn get_test_case(&self, id: &str) -> Result<TestCase>;
    async fn insert_test_case(&self, create: TestCaseCreate) -> Result<TestCase>;
    async fn update_test_case(&self, id: &str, update: TestCaseUpdate) -> Result<()>;

    /// Executions matching `filter`, newest first.
    async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<TestExecution>>;
    /// Fails with `NotFound` when the referenced test case does not exist.
    async fn insert_execution(&self, execution: NewExecution) -> Result<TestExecution>;

    async fn list_integrations(&self) -> Result<Vec<Integration>>;
    async fn get_integration(&self, id: &str) -> Result<Integration>;
    async fn touch_integration(&self, id: &str, synced_at: OffsetDateTime) -> Result<()>;

    /// Attempts for one integration, newest first.
    async fn list_sync_attempts(&self, integration_id: &str)
    -> Result<Vec<IntegrationSyncAttempt>>;
    /// Inserts an `in_progress` attempt stamped with the current time.
    async fn insert_sync_attempt(&self, attempt: NewSyncAttempt)
    -> Result<IntegrationSyncAttempt>;
    async fn update_sync_attempt(&self, id: &str, update: SyncAttemptUpdate) -> Result<()>;

    /// Reports, newest first.
    async fn list_reports(&self) -> Result<Vec<Report>>;
    async fn insert_report(&self, report: NewReport) -> Result<Report>;
}
