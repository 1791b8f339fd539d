/// Persistence seam for boards, columns and tasks
///
/// [`KanbanStore`] is the indexed store the kanban services run against. Every
/// method is one atomic unit: the PostgreSQL backend wraps each mutation in a
/// transaction and the memory backend holds one write guard for its duration.
/// That is what makes count-then-insert ranks and cascading deletes safe
/// under concurrent callers.
///
/// The store does no authorization. Ownership is checked by
/// [`crate::auth::authorization`] before a mutation reaches the store.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx over PostgreSQL, migrations in `migrations/`
/// - [`memory::MemoryStore`]: in-process tables for tests and local runs
///
/// # Example
///
/// ```
/// use kanban_shared::store::{KanbanStore, memory::MemoryStore, ranking::RankPolicy};
/// use kanban_shared::models::board::{CreateBoard, DEFAULT_COLUMNS};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), kanban_shared::store::StoreError> {
/// let store = MemoryStore::new(RankPolicy::Append);
/// let (board, columns) = store
///     .create_board(CreateBoard { name: "Sprint".into(), owner_id: Uuid::new_v4() }, &DEFAULT_COLUMNS)
///     .await?;
/// assert_eq!(columns.len(), 3);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;
pub mod ranking;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    board::{Board, CreateBoard},
    column::{Column, CreateColumn},
    task::{CreateTask, MoveTask, Task, UpdateTask},
    user::{CreateUser, User},
};
use ranking::RankPolicy;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced row does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// What a board cascade removed
#[derive(Debug, Clone)]
pub struct BoardRemoval {
    /// The deleted board
    pub board: Board,

    /// Number of columns removed with it
    pub columns_removed: u64,

    /// Number of tasks removed with it
    pub tasks_removed: u64,
}

/// What a column cascade removed
#[derive(Debug, Clone)]
pub struct ColumnRemoval {
    /// The deleted column
    pub column: Column,

    /// Number of tasks removed with it
    pub tasks_removed: u64,
}

/// Indexed, per-call atomic storage for the kanban model
#[async_trait]
pub trait KanbanStore: Send + Sync {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Rank policy applied by mutations
    fn rank_policy(&self) -> RankPolicy;

    /// Verifies the backend is reachable
    async fn health_check(&self) -> StoreResult<()>;

    // Users

    /// Inserts a user; `Conflict` if the email is taken
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Finds a user by (normalized) email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    // Boards

    /// Lists an owner's boards, newest first
    async fn list_boards(&self, owner_id: Uuid) -> StoreResult<Vec<Board>>;

    /// Finds a board by ID
    async fn find_board(&self, id: Uuid) -> StoreResult<Option<Board>>;

    /// Inserts a board and seeds `columns` at ranks `0..columns.len()`
    async fn create_board(
        &self,
        data: CreateBoard,
        columns: &[&str],
    ) -> StoreResult<(Board, Vec<Column>)>;

    /// Deletes a board's tasks, then its columns, then the board
    async fn delete_board(&self, id: Uuid) -> StoreResult<BoardRemoval>;

    // Columns

    /// Lists a board's columns by rank
    async fn list_columns(&self, board_id: Uuid) -> StoreResult<Vec<Column>>;

    /// Finds a column by ID
    async fn find_column(&self, id: Uuid) -> StoreResult<Option<Column>>;

    /// Appends a column at rank `count of the board's columns`
    async fn append_column(&self, data: CreateColumn) -> StoreResult<Column>;

    /// Deletes a column's tasks, then the column
    async fn delete_column(&self, id: Uuid) -> StoreResult<ColumnRemoval>;

    // Tasks

    /// Lists a board's tasks by rank
    async fn list_tasks(&self, board_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Finds a task by ID
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Appends a task at rank `count of the column's tasks`
    async fn append_task(&self, data: CreateTask, owner_id: Uuid) -> StoreResult<Task>;

    /// Applies a partial edit
    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Task>;

    /// Reparents and reranks a task according to the rank policy
    async fn move_task(&self, id: Uuid, destination: MoveTask) -> StoreResult<Task>;

    /// Deletes a task, returning the removed row
    async fn delete_task(&self, id: Uuid) -> StoreResult<Task>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::NotFound("board").to_string(), "board not found");
        assert!(StoreError::Conflict("email".to_string())
            .to_string()
            .contains("email"));
    }
}
