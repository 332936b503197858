//! Fault-injecting gateway wrapper for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use time::OffsetDateTime;

use super::{ExecutionFilter, Gateway, GatewayError, MemoryGateway, Result, Snapshot};
use crate::model::{
    Integration, IntegrationSyncAttempt, NewExecution, NewReport, NewSyncAttempt, Report,
    SyncAttemptUpdate, TestCase, TestCaseCreate, TestCaseUpdate, TestExecution,
};

#[derive(Default)]
pub(crate) struct FaultyGateway {
    pub inner: MemoryGateway,
    pub fail_reads: AtomicBool,
    pub fail_test_case_updates: AtomicBool,
    pub fail_sync_updates: AtomicBool,
    pub writes: AtomicUsize,
}

impl FaultyGateway {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: MemoryGateway::from_snapshot(snapshot),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable(format!("injected {} failure", what)));
        }
        Ok(())
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Gateway for FaultyGateway {
    async fn list_test_cases(&self) -> Result<Vec<TestCase>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.list_test_cases().await
    }

    async fn get_test_case(&self, id: &str) -> Result<TestCase> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.get_test_case(id).await
    }

    async fn insert_test_case(&self, create: TestCaseCreate) -> Result<TestCase> {
        self.write();
        self.inner.insert_test_case(create).await
    }

    async fn update_test_case(&self, id: &str, update: TestCaseUpdate) -> Result<()> {
        Self::check(&self.fail_test_case_updates, "test case update")?;
        self.write();
        self.inner.update_test_case(id, update).await
    }

    async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<TestExecution>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.list_executions(filter).await
    }

    async fn insert_execution(&self, execution: NewExecution) -> Result<TestExecution> {
        self.write();
        self.inner.insert_execution(execution).await
    }

    async fn list_integrations(&self) -> Result<Vec<Integration>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.list_integrations().await
    }

    async fn get_integration(&self, id: &str) -> Result<Integration> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.get_integration(id).await
    }

    async fn touch_integration(&self, id: &str, synced_at: OffsetDateTime) -> Result<()> {
        self.write();
        self.inner.touch_integration(id, synced_at).await
    }

    async fn list_sync_attempts(
        &self,
        integration_id: &str,
    ) -> Result<Vec<IntegrationSyncAttempt>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.list_sync_attempts(integration_id).await
    }

    async fn insert_sync_attempt(&self, attempt: NewSyncAttempt) -> Result<IntegrationSyncAttempt> {
        self.write();
        self.inner.insert_sync_attempt(attempt).await
    }

    async fn update_sync_attempt(&self, id: &str, update: SyncAttemptUpdate) -> Result<()> {
        Self::check(&self.fail_sync_updates, "sync update")?;
        self.write();
        self.inner.update_sync_attempt(id, update).await
    }

    async fn list_reports(&self) -> Result<Vec<Report>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.list_reports().await
    }

    async fn insert_report(&self, report: NewReport) -> Result<Report> {
        self.write();
        self.inner.insert_report(report).await
    }
}
