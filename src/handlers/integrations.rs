use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde::Deserialize;

use crate::AppError;
use crate::model::IntegrationSyncAttempt;
use crate::sync::SyncResult;

#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    /// Restricts the sync to these test cases; all stored cases when absent
    #[serde(default)]
    pub test_case_ids: Option<Vec<String>>,
}

impl SyncRequest {
    /// An empty body means "sync everything"; anything else must be a JSON `SyncRequest`.
    fn from_body(headers: &HeaderMap, body: &Bytes) -> Result<Self, AppError> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        let is_json = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
        if !is_json {
            return Err(AppError::Validation(
                "sync body must be application/json".to_string(),
            ));
        }
        let Json(request) = Json::<SyncRequest>::from_bytes(body)
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(request)
    }
}

pub async fn sync_integration(
    State(state): State<crate::SharedAppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> crate::AppResult<Json<SyncResult>> {
    let request = SyncRequest::from_body(&headers, &body)?;
    let result = state
        .dashboard
        .sync_stored_cases(&id, request.test_case_ids.as_deref())
        .await?;
    Ok(Json(result))
}

pub async fn sync_history(
    State(state): State<crate::SharedAppState>,
    Path(id): Path<String>,
) -> crate::AppResult<Json<Vec<IntegrationSyncAttempt>>> {
    let attempts = state.dashboard.sync_history(&id).await?;
    Ok(Json(attempts))
}
