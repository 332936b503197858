use axum::{Json, extract::State};

use crate::board::BoardColumn;

pub async fn board(
    State(state): State<crate::SharedAppState>,
) -> crate::AppResult<Json<Vec<BoardColumn>>> {
    let columns = state.dashboard.board().await?;
    Ok(Json(columns))
}
