/// Task endpoints
///
/// - `GET    /v1/boards/:id/tasks` - a board's tasks by rank
/// - `POST   /v1/tasks` - append a task to a column
/// - `PATCH  /v1/tasks/:id` - edit title and/or description
/// - `POST   /v1/tasks/:id/move` - move to a column and rank
/// - `DELETE /v1/tasks/:id` - delete a task
///
/// # Move
///
/// ```text
/// POST /v1/tasks/{id}/move
/// {"column_id": "…", "order": 0}
/// ```
///
/// `order` must be non-negative. How it is applied depends on the server's
/// rank policy: written as given under `append`, clamped and made dense
/// under `dense`.

use crate::{app::AppState, error::ApiResult, routes::CreatedResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::caller::Caller,
    models::task::{CreateTask, MoveTask, Task, UpdateTask},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub column_id: Uuid,
    pub board_id: Uuid,
}

/// Update task request; absent fields are left alone
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
}

/// Move task request
#[derive(Debug, Deserialize, Validate)]
pub struct MoveTaskRequest {
    pub column_id: Uuid,

    #[validate(range(min = 0, message = "Order must be non-negative"))]
    pub order: i32,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.kanban.list_tasks(&caller, board_id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    req.validate()?;

    let id = state
        .kanban
        .create_task(
            &caller,
            CreateTask {
                title: req.title,
                description: req.description,
                column_id: req.column_id,
                board_id: req.board_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .kanban
        .update_task(
            &caller,
            task_id,
            UpdateTask {
                title: req.title,
                description: req.description,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .kanban
        .move_task(
            &caller,
            task_id,
            MoveTask {
                column_id: req.column_id,
                order: req.order,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.kanban.remove_task(&caller, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
