/// Column endpoints
///
/// - `GET    /v1/boards/:id/columns` - a board's columns by rank
/// - `POST   /v1/boards/:id/columns` - append a column
/// - `DELETE /v1/columns/:id` - delete a column and its tasks

use crate::{app::AppState, error::ApiResult, routes::CreatedResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{auth::caller::Caller, models::column::Column};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create column request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateColumnRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
}

pub async fn list_columns(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Column>>> {
    Ok(Json(state.kanban.list_columns(&caller, board_id).await?))
}

pub async fn create_column(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<CreateColumnRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    req.validate()?;

    let id = state.kanban.create_column(&caller, board_id, req.name).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_column(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(column_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.kanban.remove_column(&caller, column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
