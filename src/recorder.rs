//! Records test runs and keeps the owning test case's status in step.
//!
//! Recording is two sequential writes with no transaction around them: the
//! execution insert, then the test case update. If the second write fails the
//! caller gets [`AppError::PartiallyApplied`] carrying the persisted
//! execution, which can be handed to [`ExecutionRecorder::reconcile`] later.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gateway::{ExecutionFilter, Gateway};
use crate::model::{NewExecution, Outcome, TestCaseUpdate, TestExecution};

#[derive(Clone)]
pub struct ExecutionRecorder {
    gateway: Arc<dyn Gateway>,
    default_actual_result: String,
}

impl ExecutionRecorder {
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        Self {
            gateway,
            default_actual_result: config.default_actual_result.clone(),
        }
    }

    pub async fn record_execution(
        &self,
        test_case_id: &str,
        outcome: Outcome,
        execution_time: f64,
        error_message: Option<String>,
    ) -> AppResult<TestExecution> {
        validate_execution_time(execution_time)?;

        let execution = self
            .gateway
            .insert_execution(NewExecution {
                test_case_id: test_case_id.to_string(),
                status: outcome,
                execution_time,
                error_message,
            })
            .await
            .map_err(AppError::from_gateway)?;

        if let Err(source) = self.apply_to_test_case(&execution).await {
            tracing::warn!(
                "Execution {} recorded but test case {} was not updated: {}",
                execution.id,
                execution.test_case_id,
                source
            );
            return Err(AppError::PartiallyApplied {
                execution: Box::new(execution),
                source,
            });
        }

        tracing::info!(
            "Recorded {} execution {} for test case {} ({:.2}s)",
            execution.status,
            execution.id,
            execution.test_case_id,
            execution.execution_time
        );
        Ok(execution)
    }

    /// Re-applies the test case update for an execution that is already persisted.
    pub async fn reconcile(&self, execution: &TestExecution) -> AppResult<()> {
        self.apply_to_test_case(execution)
            .await
            .map_err(AppError::from_gateway)?;
        tracing::info!(
            "Reconciled test case {} with execution {}",
            execution.test_case_id,
            execution.id
        );
        Ok(())
    }

    /// Executions of one test case, newest first.
    pub async fn executions_for(&self, test_case_id: &str) -> AppResult<Vec<TestExecution>> {
        // Surface a missing test case as NotFound rather than an empty history
        self.gateway
            .get_test_case(test_case_id)
            .await
            .map_err(AppError::from_gateway)?;
        let executions = self
            .gateway
            .list_executions(&ExecutionFilter::for_test_case(test_case_id))
            .await?;
        Ok(executions)
    }

    async fn apply_to_test_case(
        &self,
        execution: &TestExecution,
    ) -> Result<(), crate::gateway::GatewayError> {
        let update = TestCaseUpdate {
            status: execution.status.resulting_status(),
            actual_result: Some(
                execution
                    .error_message
                    .clone()
                    .unwrap_or_else(|| self.default_actual_result.clone()),
            ),
        };
        self.gateway
            .update_test_case(&execution.test_case_id, update)
            .await
    }
}

pub fn validate_execution_time(execution_time: f64) -> AppResult<()> {
    if !execution_time.is_finite() || execution_time < 0.0 {
        return Err(AppError::Validation(format!(
            "execution time must be a non-negative number of seconds, got {}",
            execution_time
        )));
    }
    Ok(())
}
