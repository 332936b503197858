//! Dashboard metrics computed from raw test cases and executions.
//!
//! The free functions are pure and never fail. [`MetricsAggregator`] reads
//! its input through the gateway and passes read failures through unchanged.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use time::{Date, OffsetDateTime};

use crate::error::{AppError, AppResult};
use crate::gateway::{ExecutionFilter, Gateway};
use crate::model::{Integration, Outcome, TestCase, TestExecution};

/// Number of calendar days in the execution trend, today included.
pub const TREND_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_test_cases: usize,
    pub active_integrations: usize,
    /// Executions inside the trend window
    pub recent_executions: usize,
    pub pass_rate: f64,
    pub test_cases_by_type: BTreeMap<String, usize>,
    pub test_cases_by_status: BTreeMap<String, usize>,
    /// One point per day, oldest first
    pub execution_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: Date,
    pub label: String,
    pub executions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestMetrics {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub pass_rate: f64,
    /// Seconds
    pub avg_execution_time: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of passed executions, 0 for an empty set.
pub fn pass_rate<'a>(executions: impl IntoIterator<Item = &'a TestExecution>) -> f64 {
    let (total, passed) = executions.into_iter().fold((0usize, 0usize), |(t, p), e| {
        (t + 1, p + usize::from(e.status == Outcome::Passed))
    });
    if total > 0 {
        round2(passed as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

/// The `TREND_DAYS` calendar days ending at `today`, oldest first.
pub fn trend_window(today: Date) -> Vec<Date> {
    let start = today - time::Duration::days(TREND_DAYS as i64 - 1);
    let mut dates: Vec<Date> = Vec::with_capacity(TREND_DAYS);
    let mut curr = start;
    while curr <= today {
        dates.push(curr);
        if let Some(next) = curr.next_day() {
            curr = next;
        } else {
            break;
        }
    }
    dates
}

fn day_label(date: Date) -> String {
    date.format(time::macros::format_description!("[month].[day]"))
        .unwrap_or_else(|_| date.to_string())
}

pub fn compute_dashboard_metrics(
    test_cases: &[TestCase],
    executions: &[TestExecution],
    integrations: &[Integration],
    today: Date,
) -> DashboardMetrics {
    let dates = trend_window(today);
    let (first, last) = (dates[0], dates[dates.len() - 1]);

    let recent: Vec<&TestExecution> = executions
        .iter()
        .filter(|e| {
            let day = e.executed_at.date();
            day >= first && day <= last
        })
        .collect();

    let mut by_day: HashMap<Date, usize> = dates.iter().map(|d| (*d, 0)).collect();
    for execution in &recent {
        *by_day.entry(execution.executed_at.date()).or_insert(0) += 1;
    }
    let execution_trend = dates
        .iter()
        .map(|d| TrendPoint {
            date: *d,
            label: day_label(*d),
            executions: *by_day.get(d).unwrap_or(&0),
        })
        .collect();

    // Unknown values land in the "unknown" bucket, so every case is counted once.
    let mut test_cases_by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut test_cases_by_status: BTreeMap<String, usize> = BTreeMap::new();
    for case in test_cases {
        *test_cases_by_type
            .entry(case.test_type.as_str().to_string())
            .or_insert(0) += 1;
        *test_cases_by_status
            .entry(case.status.as_str().to_string())
            .or_insert(0) += 1;
    }

    DashboardMetrics {
        total_test_cases: test_cases.len(),
        active_integrations: integrations.iter().filter(|i| i.is_active()).count(),
        recent_executions: recent.len(),
        pass_rate: pass_rate(recent.iter().copied()),
        test_cases_by_type,
        test_cases_by_status,
        execution_trend,
    }
}

/// Metrics over executions whose calendar date lies in `[date_from, date_to]`.
pub fn compute_test_metrics(
    executions: &[TestExecution],
    date_from: Date,
    date_to: Date,
) -> TestMetrics {
    let filter = ExecutionFilter::between(date_from, date_to);
    let window: Vec<&TestExecution> = executions.iter().filter(|e| filter.matches(e)).collect();

    let total_tests = window.len();
    let passed_tests = window
        .iter()
        .filter(|e| e.status == Outcome::Passed)
        .count();
    let failed_tests = window
        .iter()
        .filter(|e| e.status == Outcome::Failed)
        .count();

    let avg_execution_time = if total_tests > 0 {
        round2(window.iter().map(|e| e.execution_time).sum::<f64>() / total_tests as f64)
    } else {
        0.0
    };

    TestMetrics {
        total_tests,
        passed_tests,
        failed_tests,
        pass_rate: pass_rate(window.iter().copied()),
        avg_execution_time,
    }
}

/// Reads aggregation input from the gateway.
#[derive(Clone)]
pub struct MetricsAggregator {
    gateway: Arc<dyn Gateway>,
}

impl MetricsAggregator {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn dashboard_metrics(&self) -> AppResult<DashboardMetrics> {
        self.dashboard_metrics_on(OffsetDateTime::now_utc().date())
            .await
    }

    /// Dashboard metrics with the trend window ending at `today`.
    pub async fn dashboard_metrics_on(&self, today: Date) -> AppResult<DashboardMetrics> {
        let window = trend_window(today);
        let filter = ExecutionFilter::between(window[0], today);

        let test_cases = self.gateway.list_test_cases().await?;
        let executions = self.gateway.list_executions(&filter).await?;
        let integrations = self.gateway.list_integrations().await?;

        Ok(compute_dashboard_metrics(
            &test_cases,
            &executions,
            &integrations,
            today,
        ))
    }

    pub async fn test_metrics(&self, date_from: Date, date_to: Date) -> AppResult<TestMetrics> {
        if date_from > date_to {
            return Err(AppError::InvalidRange {
                from: date_from,
                to: date_to,
            });
        }
        let filter = ExecutionFilter::between(date_from, date_to);
        let executions = self.gateway.list_executions(&filter).await?;
        Ok(compute_test_metrics(&executions, date_from, date_to))
    }
}
