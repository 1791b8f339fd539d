/// Board endpoints
///
/// - `GET    /v1/boards` - the caller's boards, newest first
/// - `POST   /v1/boards` - create a board with the default columns
/// - `GET    /v1/boards/:id` - one board, or `null`
/// - `DELETE /v1/boards/:id` - delete a board with its columns and tasks
/// - `GET    /v1/boards/:id/view` - board, columns and tasks in one read
///
/// Reads answer `[]`/`null` to anonymous callers and non-owners instead of
/// failing.

use crate::{app::AppState, error::ApiResult, routes::CreatedResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::caller::Caller,
    models::board::Board,
    services::BoardView,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
}

pub async fn list_boards(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.kanban.list_boards(&caller).await?))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    req.validate()?;

    let id = state.kanban.create_board(&caller, req.name).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Option<Board>>> {
    Ok(Json(state.kanban.get_board(&caller, board_id).await?))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.kanban.remove_board(&caller, board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn view_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Option<BoardView>>> {
    Ok(Json(state.kanban.view_board(&caller, board_id).await?))
}
