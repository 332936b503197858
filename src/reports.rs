use serde::Serialize;
use std::sync::Arc;
use time::Date;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;
use crate::metrics::{MetricsAggregator, TestMetrics};
use crate::model::{NewReport, Report, ReportStatus};

/// A persisted report together with the metrics it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedReport {
    pub report: Report,
    pub metrics: TestMetrics,
}

#[derive(Clone)]
pub struct ReportMaterializer {
    gateway: Arc<dyn Gateway>,
    metrics: MetricsAggregator,
    owner_id: String,
}

impl ReportMaterializer {
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        Self {
            metrics: MetricsAggregator::new(gateway.clone()),
            gateway,
            owner_id: config.owner_id.clone(),
        }
    }

    pub async fn generate_report(
        &self,
        report_type: &str,
        date_from: Date,
        date_to: Date,
    ) -> AppResult<GeneratedReport> {
        let report_type = report_type.trim();
        if report_type.is_empty() {
            return Err(AppError::Validation("report type must not be empty".to_string()));
        }
        if date_from > date_to {
            return Err(AppError::InvalidRange {
                from: date_from,
                to: date_to,
            });
        }

        let metrics = self.metrics.test_metrics(date_from, date_to).await?;

        let report = self
            .gateway
            .insert_report(NewReport {
                name: report_name(report_type, date_from, date_to),
                report_type: report_type.to_string(),
                date_from,
                date_to,
                status: ReportStatus::Completed,
                user_id: self.owner_id.clone(),
                description: Some(format!(
                    "Report covering {} tests from {} to {} ({}% pass rate)",
                    metrics.total_tests, date_from, date_to, metrics.pass_rate
                )),
            })
            .await?;

        tracing::info!(
            "Generated {} report {} for {}..{} ({} tests)",
            report.report_type,
            report.id,
            date_from,
            date_to,
            metrics.total_tests
        );
        Ok(GeneratedReport { report, metrics })
    }

    pub async fn list_reports(&self) -> AppResult<Vec<Report>> {
        Ok(self.gateway.list_reports().await?)
    }
}

/// "test_summary" -> "Test Summary Report 2024-01-01 - 2024-01-31"
fn report_name(report_type: &str, date_from: Date, date_to: Date) -> String {
    let title: Vec<String> = report_type
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    format!("{} Report {} - {}", title.join(" "), date_from, date_to)
}
