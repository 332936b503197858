use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{ExecutionFilter, Gateway, GatewayError, Result, Table};
use crate::model::{
    Integration, IntegrationSyncAttempt, NewExecution, NewReport, NewSyncAttempt, Report,
    SyncAttemptUpdate, SyncStatus, TestCase, TestCaseCreate, TestCaseUpdate, TestExecution,
    TestStatus,
};

/// Full contents of the store, also the on-disk format.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub test_executions: Vec<TestExecution>,
    #[serde(default)]
    pub integrations: Vec<Integration>,
    #[serde(default)]
    pub integration_syncs: Vec<IntegrationSyncAttempt>,
    #[serde(default)]
    pub reports: Vec<Report>,
    /// Last value handed to the id generator
    #[serde(default)]
    pub sequence: u64,
}

impl Snapshot {
    fn next_id(&mut self, table: Table) -> String {
        self.sequence += 1;
        let generator = block_id::BlockId::new(block_id::Alphabet::alphanumeric(), 1234, 5);
        let encoded = generator
            .encode_string(self.sequence)
            .unwrap_or_else(|| self.sequence.to_string());
        format!("{}-{}", table.id_prefix(), encoded)
    }
}

/// In-process gateway backed by [`Snapshot`] tables.
///
/// When created with [`MemoryGateway::open`] every write is flushed to the
/// snapshot file as pretty-printed JSON.
pub struct MemoryGateway {
    tables: RwLock<Snapshot>,
    path: Option<PathBuf>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
            path: None,
        }
    }

    /// Loads the snapshot at `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            "Loaded {} test cases, {} executions from {}",
            snapshot.test_cases.len(),
            snapshot.test_executions.len(),
            path.display()
        );
        Ok(Self {
            tables: RwLock::new(snapshot),
            path: Some(path),
        })
    }

    /// Copy of the current tables
    pub async fn snapshot(&self) -> Snapshot {
        self.tables.read().await.clone()
    }

    /// Applies `change` to a copy of the tables and keeps the copy only once
    /// it is flushed, so a failed write leaves no trace in memory either.
    async fn write<T>(&self, change: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        let out = change(&mut next)?;
        self.flush(&next).await?;
        *tables = next;
        Ok(out)
    }

    async fn flush(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec_pretty(snapshot)?;
            tokio::fs::write(path, bytes).await?;
        }
        Ok(())
    }
}

fn not_found(table: Table, id: &str) -> GatewayError {
    GatewayError::NotFound {
        table,
        id: id.to_string(),
    }
}

/// Newest first by `key`; rows with the same key keep the latest insert on top.
fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.reverse();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list_test_cases(&self) -> Result<Vec<TestCase>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.test_cases.clone(), |c| c.created_at))
    }

    async fn get_test_case(&self, id: &str) -> Result<TestCase> {
        let tables = self.tables.read().await;
        tables
            .test_cases
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found(Table::TestCases, id))
    }

    async fn insert_test_case(&self, create: TestCaseCreate) -> Result<TestCase> {
        self.write(|tables| {
            let now = OffsetDateTime::now_utc();
            let case = TestCase {
                id: tables.next_id(Table::TestCases),
                title: create.title,
                description: create.description,
                test_type: create.test_type,
                priority: create.priority,
                status: create.status.unwrap_or(TestStatus::Todo),
                steps: create.steps,
                expected_result: create.expected_result,
                actual_result: None,
                user_id: create.user_id.unwrap_or_default(),
                created_at: now,
                updated_at: now,
            };
            tables.test_cases.push(case.clone());
            Ok(case)
        })
        .await
    }

    async fn update_test_case(&self, id: &str, update: TestCaseUpdate) -> Result<()> {
        self.write(|tables| {
            let case = tables
                .test_cases
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found(Table::TestCases, id))?;

            if let Some(status) = update.status {
                case.status = status;
            }
            if let Some(actual_result) = update.actual_result {
                case.actual_result = Some(actual_result);
            }
            case.updated_at = OffsetDateTime::now_utc();
            Ok(())
        })
        .await
    }

    async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<TestExecution>> {
        let tables = self.tables.read().await;
        let executions: Vec<TestExecution> = tables
            .test_executions
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        Ok(newest_first(executions, |e| e.executed_at))
    }

    async fn insert_execution(&self, execution: NewExecution) -> Result<TestExecution> {
        self.write(|tables| {
            if !tables
                .test_cases
                .iter()
                .any(|c| c.id == execution.test_case_id)
            {
                return Err(not_found(Table::TestCases, &execution.test_case_id));
            }

            let row = TestExecution {
                id: tables.next_id(Table::TestExecutions),
                test_case_id: execution.test_case_id,
                status: execution.status,
                executed_at: OffsetDateTime::now_utc(),
                execution_time: execution.execution_time,
                error_message: execution.error_message,
            };
            tables.test_executions.push(row.clone());
            Ok(row)
        })
        .await
    }

    async fn list_integrations(&self) -> Result<Vec<Integration>> {
        Ok(self.tables.read().await.integrations.clone())
    }

    async fn get_integration(&self, id: &str) -> Result<Integration> {
        let tables = self.tables.read().await;
        tables
            .integrations
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| not_found(Table::Integrations, id))
    }

    async fn touch_integration(&self, id: &str, synced_at: OffsetDateTime) -> Result<()> {
        self.write(|tables| {
            let integration = tables
                .integrations
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| not_found(Table::Integrations, id))?;
            integration.last_sync_at = Some(synced_at);
            Ok(())
        })
        .await
    }

    async fn list_sync_attempts(
        &self,
        integration_id: &str,
    ) -> Result<Vec<IntegrationSyncAttempt>> {
        let tables = self.tables.read().await;
        let attempts: Vec<IntegrationSyncAttempt> = tables
            .integration_syncs
            .iter()
            .filter(|s| s.integration_id == integration_id)
            .cloned()
            .collect();
        Ok(newest_first(attempts, |s| s.started_at))
    }

    async fn insert_sync_attempt(&self, attempt: NewSyncAttempt) -> Result<IntegrationSyncAttempt> {
        self.write(|tables| {
            if !tables
                .integrations
                .iter()
                .any(|i| i.id == attempt.integration_id)
            {
                return Err(not_found(Table::Integrations, &attempt.integration_id));
            }

            let row = IntegrationSyncAttempt {
                id: tables.next_id(Table::IntegrationSyncs),
                integration_id: attempt.integration_id,
                sync_status: SyncStatus::InProgress,
                items_synced: 0,
                started_at: OffsetDateTime::now_utc(),
                completed_at: None,
                error_message: None,
            };
            tables.integration_syncs.push(row.clone());
            Ok(row)
        })
        .await
    }

    async fn update_sync_attempt(&self, id: &str, update: SyncAttemptUpdate) -> Result<()> {
        self.write(|tables| {
            let attempt = tables
                .integration_syncs
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| not_found(Table::IntegrationSyncs, id))?;

            attempt.sync_status = update.sync_status;
            attempt.items_synced = update.items_synced;
            attempt.completed_at = Some(update.completed_at);
            attempt.error_message = update.error_message;
            Ok(())
        })
        .await
    }

    async fn list_reports(&self) -> Result<Vec<Report>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.reports.clone(), |r| r.created_at))
    }

    async fn insert_report(&self, report: NewReport) -> Result<Report> {
        self.write(|tables| {
            let row = Report {
                id: tables.next_id(Table::Reports),
                name: report.name,
                report_type: report.report_type,
                date_from: report.date_from,
                date_to: report.date_to,
                status: report.status,
                user_id: report.user_id,
                description: report.description,
                created_at: OffsetDateTime::now_utc(),
            };
            tables.reports.push(row.clone());
            Ok(row)
        })
        .await
    }
}
