use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use time::Date;

use crate::metrics::{DashboardMetrics, TestMetrics};

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub from: Date,
    pub to: Date,
}

pub async fn dashboard_metrics(
    State(state): State<crate::SharedAppState>,
) -> crate::AppResult<Json<DashboardMetrics>> {
    let metrics = state.dashboard.compute_dashboard_metrics().await?;
    Ok(Json(metrics))
}

pub async fn test_metrics(
    State(state): State<crate::SharedAppState>,
    Query(query): Query<MetricsQuery>,
) -> crate::AppResult<Json<TestMetrics>> {
    let metrics = state
        .dashboard
        .compute_test_metrics(query.from, query.to)
        .await?;
    Ok(Json(metrics))
}
