use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use time::Date;

use crate::model::Report;
use crate::reports::GeneratedReport;

#[derive(Debug, Deserialize)]
pub struct GenerateReport {
    #[serde(rename = "type")]
    pub report_type: String,
    pub date_from: Date,
    pub date_to: Date,
}

pub async fn list_reports(
    State(state): State<crate::SharedAppState>,
) -> crate::AppResult<Json<Vec<Report>>> {
    let reports = state.dashboard.list_reports().await?;
    Ok(Json(reports))
}

pub async fn generate_report(
    State(state): State<crate::SharedAppState>,
    Json(request): Json<GenerateReport>,
) -> crate::AppResult<(StatusCode, Json<GeneratedReport>)> {
    let generated = state
        .dashboard
        .generate_report(&request.report_type, request.date_from, request.date_to)
        .await?;
    Ok((StatusCode::CREATED, Json(generated)))
}
