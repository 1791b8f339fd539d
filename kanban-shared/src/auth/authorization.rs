/// Ownership guard
///
/// Every service operation passes through one of these checks before it
/// touches the store. Ownership is by user ID only: a board belongs to its
/// `owner_id`, a column to its board's owner, a task to its own `owner_id`.
///
/// A missing entity and an entity owned by someone else produce the same
/// [`AuthzError::NotFound`], so a caller cannot probe for IDs it doesn't own.
///
/// Reads use the `visible_*` variants, which turn both cases into `None`.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::{authorization::{require_board_owner, AuthzError}, caller::Caller};
/// use kanban_shared::store::{memory::MemoryStore, ranking::RankPolicy};
/// use uuid::Uuid;
///
/// # async fn example() {
/// let store = MemoryStore::new(RankPolicy::Append);
/// let result = require_board_owner(&store, &Caller::Anonymous, Uuid::new_v4()).await;
/// assert!(matches!(result, Err(AuthzError::Unauthenticated)));
/// # }
/// ```

use uuid::Uuid;

use super::caller::Caller;
use crate::models::{board::Board, column::Column, task::Task};
use crate::store::{KanbanStore, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Anonymous caller attempted a write
    #[error("Authentication required")]
    Unauthenticated,

    /// Entity missing or owned by someone else
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Store failed while resolving the entity
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Requires an authenticated caller, returning its user ID
pub fn require_user(caller: &Caller) -> Result<Uuid, AuthzError> {
    caller.user_id().ok_or(AuthzError::Unauthenticated)
}

/// Requires that the caller owns the board
pub async fn require_board_owner(
    store: &dyn KanbanStore,
    caller: &Caller,
    board_id: Uuid,
) -> Result<Board, AuthzError> {
    let user_id = require_user(caller)?;

    match store.find_board(board_id).await? {
        Some(board) if board.is_owned_by(user_id) => Ok(board),
        _ => Err(AuthzError::NotFound("board")),
    }
}

/// Requires that the caller owns the board the column belongs to
pub async fn require_column_owner(
    store: &dyn KanbanStore,
    caller: &Caller,
    column_id: Uuid,
) -> Result<Column, AuthzError> {
    let user_id = require_user(caller)?;

    let column = store
        .find_column(column_id)
        .await?
        .ok_or(AuthzError::NotFound("column"))?;

    match store.find_board(column.board_id).await? {
        Some(board) if board.is_owned_by(user_id) => Ok(column),
        _ => Err(AuthzError::NotFound("column")),
    }
}

/// Requires that the caller owns the task
pub async fn require_task_owner(
    store: &dyn KanbanStore,
    caller: &Caller,
    task_id: Uuid,
) -> Result<Task, AuthzError> {
    let user_id = require_user(caller)?;

    match store.find_task(task_id).await? {
        Some(task) if task.owner_id == user_id => Ok(task),
        _ => Err(AuthzError::NotFound("task")),
    }
}

/// The board if the caller may read it, else `None`
pub async fn visible_board(
    store: &dyn KanbanStore,
    caller: &Caller,
    board_id: Uuid,
) -> Result<Option<Board>, StoreError> {
    let Some(user_id) = caller.user_id() else {
        return Ok(None);
    };

    Ok(store
        .find_board(board_id)
        .await?
        .filter(|board| board.is_owned_by(user_id)))
}
