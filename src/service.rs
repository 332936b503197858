//! The dashboard core as one explicitly constructed service.
//!
//! [`Dashboard`] owns nothing but its injected gateway and configuration, so
//! it is cheap to clone into request handlers and holds no state between
//! calls.

use std::collections::HashSet;
use std::sync::Arc;
use time::Date;

use crate::board::{BoardColumn, build_board};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;
use crate::metrics::{DashboardMetrics, MetricsAggregator, TestMetrics};
use crate::model::{
    IntegrationSyncAttempt, Outcome, Report, TestCase, TestCaseCreate, TestExecution,
};
use crate::recorder::ExecutionRecorder;
use crate::reports::{GeneratedReport, ReportMaterializer};
use crate::sync::{ProviderFactory, SyncCoordinator, SyncResult};

#[derive(Clone)]
pub struct Dashboard {
    gateway: Arc<dyn Gateway>,
    config: Config,
    metrics: MetricsAggregator,
    recorder: ExecutionRecorder,
    sync: SyncCoordinator,
    reports: ReportMaterializer,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn Gateway>, config: Config) -> Self {
        Self {
            metrics: MetricsAggregator::new(gateway.clone()),
            recorder: ExecutionRecorder::new(gateway.clone(), &config),
            sync: SyncCoordinator::new(gateway.clone(), &config),
            reports: ReportMaterializer::new(gateway.clone(), &config),
            gateway,
            config,
        }
    }

    /// Replaces the built-in provider steps.
    pub fn with_providers(mut self, providers: Arc<dyn ProviderFactory>) -> Self {
        self.sync = self.sync.with_providers(providers);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn compute_dashboard_metrics(&self) -> AppResult<DashboardMetrics> {
        self.metrics.dashboard_metrics().await
    }

    pub async fn compute_test_metrics(&self, date_from: Date, date_to: Date) -> AppResult<TestMetrics> {
        self.metrics.test_metrics(date_from, date_to).await
    }

    /// Records a run. A missing `execution_time` counts as zero seconds.
    pub async fn record_execution(
        &self,
        test_case_id: &str,
        outcome: Outcome,
        execution_time: Option<f64>,
        error_message: Option<String>,
    ) -> AppResult<TestExecution> {
        self.recorder
            .record_execution(
                test_case_id,
                outcome,
                execution_time.unwrap_or(0.0),
                error_message,
            )
            .await
    }

    pub async fn reconcile_execution(&self, execution: &TestExecution) -> AppResult<()> {
        self.recorder.reconcile(execution).await
    }

    pub async fn executions_for(&self, test_case_id: &str) -> AppResult<Vec<TestExecution>> {
        self.recorder.executions_for(test_case_id).await
    }

    pub async fn sync_integration(
        &self,
        integration_id: &str,
        test_cases: &[TestCase],
    ) -> AppResult<SyncResult> {
        self.sync.sync_integration(integration_id, test_cases).await
    }

    /// Syncs the stored test cases: all of them, or only `ids` when given.
    pub async fn sync_stored_cases(
        &self,
        integration_id: &str,
        ids: Option<&[String]>,
    ) -> AppResult<SyncResult> {
        let all = self.gateway.list_test_cases().await?;
        let selected = match ids {
            None => all,
            Some(ids) => {
                let known: HashSet<&str> = all.iter().map(|c| c.id.as_str()).collect();
                if let Some(missing) = ids.iter().find(|id| !known.contains(id.as_str())) {
                    return Err(AppError::NotFound(format!("Test case {}", missing)));
                }
                let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
                all.into_iter()
                    .filter(|c| wanted.contains(c.id.as_str()))
                    .collect()
            }
        };
        self.sync.sync_integration(integration_id, &selected).await
    }

    pub async fn sync_history(&self, integration_id: &str) -> AppResult<Vec<IntegrationSyncAttempt>> {
        self.sync.sync_history(integration_id).await
    }

    pub async fn generate_report(
        &self,
        report_type: &str,
        date_from: Date,
        date_to: Date,
    ) -> AppResult<GeneratedReport> {
        self.reports
            .generate_report(report_type, date_from, date_to)
            .await
    }

    pub async fn list_reports(&self) -> AppResult<Vec<Report>> {
        self.reports.list_reports().await
    }

    pub async fn list_test_cases(&self) -> AppResult<Vec<TestCase>> {
        Ok(self.gateway.list_test_cases().await?)
    }

    pub async fn create_test_case(&self, mut create: TestCaseCreate) -> AppResult<TestCase> {
        create.title = create.title.trim().to_string();
        if create.title.is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if create.user_id.is_none() {
            create.user_id = Some(self.config.owner_id.clone());
        }
        let case = self.gateway.insert_test_case(create).await?;
        tracing::info!("Created test case {} ({})", case.id, case.title);
        Ok(case)
    }

    pub async fn board(&self) -> AppResult<Vec<BoardColumn>> {
        let test_cases = self.gateway.list_test_cases().await?;
        Ok(build_board(&test_cases))
    }
}
