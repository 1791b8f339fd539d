/// PostgreSQL store backend
///
/// Composes the SQL operations on the model types into one transaction per
/// mutation. Any mutation that reads ranks before writing them first takes a
/// row lock on every board it touches (`SELECT ... FOR UPDATE`), always in
/// ascending ID order so two transactions never wait on each other in a cycle.
///
/// # Example
///
/// ```no_run
/// use kanban_shared::db::pool::{create_pool, DatabaseConfig};
/// use kanban_shared::store::{postgres::PgStore, ranking::RankPolicy, KanbanStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let store = PgStore::new(pool, RankPolicy::Dense);
/// store.health_check().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    ranking::{self, RankChange, RankPolicy, Ranked},
    BoardRemoval, ColumnRemoval, KanbanStore, StoreError, StoreResult,
};
use crate::db::pool::health_check;
use crate::models::{
    board::{Board, CreateBoard},
    column::{Column, CreateColumn},
    task::{CreateTask, MoveTask, Task, UpdateTask},
    user::{CreateUser, User},
};

/// PostgreSQL-backed [`KanbanStore`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    policy: RankPolicy,
}

impl PgStore {
    /// Wraps a connected pool
    pub fn new(pool: PgPool, policy: RankPolicy) -> Self {
        Self { pool, policy }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Locks the given boards in ascending ID order
///
/// Fails with `NotFound("board")` if any of them is gone.
async fn lock_boards(conn: &mut PgConnection, ids: &[Uuid]) -> StoreResult<()> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();

    for id in ids {
        Board::find_by_id_for_update(&mut *conn, id)
            .await?
            .ok_or(StoreError::NotFound("board"))?;
    }

    Ok(())
}

async fn apply_task_ranks(conn: &mut PgConnection, changes: &[RankChange]) -> StoreResult<()> {
    for change in changes {
        Task::set_order(&mut *conn, change.id, change.order).await?;
    }
    Ok(())
}

async fn apply_column_ranks(conn: &mut PgConnection, changes: &[RankChange]) -> StoreResult<()> {
    for change in changes {
        Column::set_order(&mut *conn, change.id, change.order).await?;
    }
    Ok(())
}

/// Ranked view of a column's tasks, minus `except`
async fn ranked_tasks_in(
    conn: &mut PgConnection,
    column_id: Uuid,
    except: Uuid,
) -> StoreResult<Vec<Ranked>> {
    let tasks = Task::list_by_column(conn, column_id).await?;
    Ok(tasks.iter().filter(|t| t.id != except).map(Ranked::from).collect())
}

fn unique_violation_to_conflict(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl KanbanStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn rank_policy(&self) -> RankPolicy {
        self.policy
    }

    async fn health_check(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut conn = self.pool.acquire().await?;

        User::create(&mut conn, data)
            .await
            .map_err(|e| unique_violation_to_conflict(e, "Email already exists"))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        Ok(User::find_by_email(&mut conn, email).await?)
    }

    async fn list_boards(&self, owner_id: Uuid) -> StoreResult<Vec<Board>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Board::list_by_owner(&mut conn, owner_id).await?)
    }

    async fn find_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Board::find_by_id(&mut conn, id).await?)
    }

    #[instrument(skip(self, data, columns), fields(owner_id = %data.owner_id))]
    async fn create_board(
        &self,
        data: CreateBoard,
        columns: &[&str],
    ) -> StoreResult<(Board, Vec<Column>)> {
        let mut tx = self.pool.begin().await?;

        let board = Board::create(&mut *tx, data).await?;

        let mut seeded = Vec::with_capacity(columns.len());
        for (order, name) in columns.iter().enumerate() {
            let column = Column::create(
                &mut *tx,
                CreateColumn {
                    board_id: board.id,
                    name: (*name).to_string(),
                },
                order as i32,
            )
            .await?;
            seeded.push(column);
        }

        tx.commit().await?;

        Ok((board, seeded))
    }

    #[instrument(skip(self))]
    async fn delete_board(&self, id: Uuid) -> StoreResult<BoardRemoval> {
        let mut tx = self.pool.begin().await?;

        let board = Board::find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound("board"))?;

        let tasks_removed = Task::delete_by_board(&mut *tx, id).await?;
        let columns_removed = Column::delete_by_board(&mut *tx, id).await?;
        Board::delete(&mut *tx, id).await?;

        tx.commit().await?;

        debug!(tasks_removed, columns_removed, "Board cascade applied");

        Ok(BoardRemoval {
            board,
            columns_removed,
            tasks_removed,
        })
    }

    async fn list_columns(&self, board_id: Uuid) -> StoreResult<Vec<Column>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Column::list_by_board(&mut conn, board_id).await?)
    }

    async fn find_column(&self, id: Uuid) -> StoreResult<Option<Column>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Column::find_by_id(&mut conn, id).await?)
    }

    #[instrument(skip(self, data), fields(board_id = %data.board_id))]
    async fn append_column(&self, data: CreateColumn) -> StoreResult<Column> {
        let mut tx = self.pool.begin().await?;

        lock_boards(&mut tx, &[data.board_id]).await?;

        let order = Column::count_by_board(&mut *tx, data.board_id).await? as i32;
        let column = Column::create(&mut *tx, data, order).await?;

        tx.commit().await?;

        Ok(column)
    }

    #[instrument(skip(self))]
    async fn delete_column(&self, id: Uuid) -> StoreResult<ColumnRemoval> {
        let mut tx = self.pool.begin().await?;

        let board_id = Column::find_by_id(&mut *tx, id)
            .await?
            .map(|c| c.board_id)
            .ok_or(StoreError::NotFound("column"))?;

        lock_boards(&mut tx, &[board_id]).await?;

        // Re-read under the lock; a concurrent delete may have won
        let column = Column::find_by_id(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound("column"))?;

        let tasks_removed = Task::delete_by_column(&mut *tx, id).await?;
        Column::delete(&mut *tx, id).await?;

        if self.policy.is_dense() {
            let remaining: Vec<Ranked> = Column::list_by_board(&mut *tx, board_id)
                .await?
                .iter()
                .map(Ranked::from)
                .collect();
            apply_column_ranks(&mut tx, &ranking::compact(&remaining)).await?;
        }

        tx.commit().await?;

        Ok(ColumnRemoval {
            column,
            tasks_removed,
        })
    }

    async fn list_tasks(&self, board_id: Uuid) -> StoreResult<Vec<Task>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Task::list_by_board(&mut conn, board_id).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let mut conn = self.pool.acquire().await?;
        Ok(Task::find_by_id(&mut conn, id).await?)
    }

    #[instrument(skip(self, data), fields(board_id = %data.board_id, column_id = %data.column_id))]
    async fn append_task(&self, data: CreateTask, owner_id: Uuid) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;

        let column_board = Column::find_by_id(&mut *tx, data.column_id)
            .await?
            .map(|c| c.board_id)
            .ok_or(StoreError::NotFound("column"))?;

        lock_boards(&mut tx, &[data.board_id, column_board]).await?;

        if Column::find_by_id(&mut *tx, data.column_id).await?.is_none() {
            return Err(StoreError::NotFound("column"));
        }

        let order = Task::count_by_column(&mut *tx, data.column_id).await? as i32;
        let task = Task::create(&mut *tx, data, owner_id, order).await?;

        tx.commit().await?;

        Ok(task)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Task> {
        let mut conn = self.pool.acquire().await?;

        Task::update(&mut conn, id, data)
            .await?
            .ok_or(StoreError::NotFound("task"))
    }

    #[instrument(skip(self, destination), fields(column_id = %destination.column_id, order = destination.order))]
    async fn move_task(&self, id: Uuid, destination: MoveTask) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;

        let task = Task::find_by_id(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound("task"))?;
        let target_board = Column::find_by_id(&mut *tx, destination.column_id)
            .await?
            .map(|c| c.board_id)
            .ok_or(StoreError::NotFound("column"))?;
        let source_board = Column::find_by_id(&mut *tx, task.column_id)
            .await?
            .map(|c| c.board_id)
            .unwrap_or(task.board_id);

        lock_boards(&mut tx, &[source_board, target_board]).await?;

        let task = Task::find_by_id(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound("task"))?;
        if Column::find_by_id(&mut *tx, destination.column_id).await?.is_none() {
            return Err(StoreError::NotFound("column"));
        }

        let order = if self.policy.is_dense() {
            let siblings = ranked_tasks_in(&mut tx, destination.column_id, id).await?;
            let vacated = if task.column_id != destination.column_id {
                Some(ranked_tasks_in(&mut tx, task.column_id, id).await?)
            } else {
                None
            };

            let plan = ranking::plan_move(&siblings, vacated.as_deref(), destination.order);
            apply_task_ranks(&mut tx, &plan.changes).await?;
            plan.order
        } else {
            destination.order
        };

        let moved = Task::set_placement(&mut *tx, id, destination.column_id, order)
            .await?
            .ok_or(StoreError::NotFound("task"))?;

        tx.commit().await?;

        Ok(moved)
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: Uuid) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;

        let task = Task::find_by_id(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound("task"))?;

        if self.policy.is_dense() {
            let board_id = Column::find_by_id(&mut *tx, task.column_id)
                .await?
                .map(|c| c.board_id)
                .unwrap_or(task.board_id);
            lock_boards(&mut tx, &[board_id]).await?;
        }

        if !Task::delete(&mut *tx, id).await? {
            return Err(StoreError::NotFound("task"));
        }

        if self.policy.is_dense() {
            let remaining = ranked_tasks_in(&mut tx, task.column_id, id).await?;
            apply_task_ranks(&mut tx, &ranking::compact(&remaining)).await?;
        }

        tx.commit().await?;

        Ok(task)
    }
}
