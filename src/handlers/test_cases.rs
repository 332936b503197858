use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::model::{Outcome, TestCase, TestCaseCreate, TestExecution};

#[derive(Debug, Deserialize)]
pub struct RecordExecution {
    /// passed, failed or skipped
    pub outcome: String,
    pub execution_time: Option<f64>,
    pub error_message: Option<String>,
}

pub async fn list_test_cases(
    State(state): State<crate::SharedAppState>,
) -> crate::AppResult<Json<Vec<TestCase>>> {
    let cases = state.dashboard.list_test_cases().await?;
    Ok(Json(cases))
}

pub async fn create_test_case(
    State(state): State<crate::SharedAppState>,
    Json(create): Json<TestCaseCreate>,
) -> crate::AppResult<(StatusCode, Json<TestCase>)> {
    let case = state.dashboard.create_test_case(create).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

pub async fn list_executions(
    State(state): State<crate::SharedAppState>,
    Path(id): Path<String>,
) -> crate::AppResult<Json<Vec<TestExecution>>> {
    let executions = state.dashboard.executions_for(&id).await?;
    Ok(Json(executions))
}

pub async fn record_execution(
    State(state): State<crate::SharedAppState>,
    Path(id): Path<String>,
    Json(request): Json<RecordExecution>,
) -> crate::AppResult<(StatusCode, Json<TestExecution>)> {
    let outcome: Outcome = request.outcome.parse()?;
    let execution = state
        .dashboard
        .record_execution(&id, outcome, request.execution_time, request.error_message)
        .await?;
    Ok((StatusCode::CREATED, Json(execution)))
}
