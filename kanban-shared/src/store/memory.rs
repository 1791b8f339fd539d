/// In-process store backend
///
/// Keeps all tables behind a single `tokio::sync::RwLock`. Reads share the
/// lock; every mutation holds the write guard from its first read to its last
/// write, which gives each call the same atomicity the PostgreSQL backend gets
/// from a transaction.
///
/// Used by the test suites and by `STORAGE_BACKEND=memory` for local runs.
/// Nothing is persisted.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    ranking::{self, RankChange, RankPolicy, Ranked},
    BoardRemoval, ColumnRemoval, KanbanStore, StoreError, StoreResult,
};
use crate::models::{
    board::{Board, CreateBoard},
    column::{Column, CreateColumn},
    task::{CreateTask, MoveTask, Task, UpdateTask},
    user::{normalize_email, CreateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    boards: HashMap<Uuid, Board>,
    columns: HashMap<Uuid, Column>,
    tasks: HashMap<Uuid, Task>,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing creation timestamps, so age ordering is total
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(stamp);
        stamp
    }

    fn columns_of(&self, board_id: Uuid) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .columns
            .values()
            .filter(|c| c.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        columns
    }

    fn tasks_where(&self, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().filter(|t| predicate(t)).cloned().collect();
        tasks.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        tasks
    }

    fn ranked_tasks_in(&self, column_id: Uuid, except: Uuid) -> Vec<Ranked> {
        self.tasks
            .values()
            .filter(|t| t.column_id == column_id && t.id != except)
            .map(Ranked::from)
            .collect()
    }

    fn apply_task_ranks(&mut self, changes: &[RankChange]) {
        for change in changes {
            if let Some(task) = self.tasks.get_mut(&change.id) {
                task.order = change.order;
            }
        }
    }

    fn apply_column_ranks(&mut self, changes: &[RankChange]) {
        for change in changes {
            if let Some(column) = self.columns.get_mut(&change.id) {
                column.order = change.order;
            }
        }
    }
}

/// Memory-backed [`KanbanStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    policy: RankPolicy,
}

impl MemoryStore {
    /// Creates an empty store with the given rank policy
    pub fn new(policy: RankPolicy) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            policy,
        }
    }
}

#[async_trait]
impl KanbanStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn rank_policy(&self) -> RankPolicy {
        self.policy
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = normalize_email(&data.email);

        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("Email already exists".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: data.password_hash,
            name: data.name,
            created_at: tables.now(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        let email = normalize_email(email);

        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_boards(&self, owner_id: Uuid) -> StoreResult<Vec<Board>> {
        let tables = self.tables.read().await;
        let mut boards: Vec<Board> = tables
            .boards
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(boards)
    }

    async fn find_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        Ok(self.tables.read().await.boards.get(&id).cloned())
    }

    async fn create_board(
        &self,
        data: CreateBoard,
        columns: &[&str],
    ) -> StoreResult<(Board, Vec<Column>)> {
        let mut tables = self.tables.write().await;

        let board = Board {
            id: Uuid::new_v4(),
            name: data.name,
            owner_id: data.owner_id,
            created_at: tables.now(),
        };
        tables.boards.insert(board.id, board.clone());

        let mut seeded = Vec::with_capacity(columns.len());
        for (order, name) in columns.iter().enumerate() {
            let column = Column {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                board_id: board.id,
                order: order as i32,
                created_at: tables.now(),
            };
            tables.columns.insert(column.id, column.clone());
            seeded.push(column);
        }

        Ok((board, seeded))
    }

    async fn delete_board(&self, id: Uuid) -> StoreResult<BoardRemoval> {
        let mut tables = self.tables.write().await;

        if !tables.boards.contains_key(&id) {
            return Err(StoreError::NotFound("board"));
        }

        let column_ids: Vec<Uuid> = tables
            .columns
            .values()
            .filter(|c| c.board_id == id)
            .map(|c| c.id)
            .collect();

        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|_, t| t.board_id != id && !column_ids.contains(&t.column_id));
        let tasks_removed = (before - tables.tasks.len()) as u64;

        for column_id in &column_ids {
            tables.columns.remove(column_id);
        }

        let board = tables
            .boards
            .remove(&id)
            .ok_or(StoreError::NotFound("board"))?;

        debug!(board_id = %id, tasks_removed, columns_removed = column_ids.len(), "Board cascade applied");

        Ok(BoardRemoval {
            board,
            columns_removed: column_ids.len() as u64,
            tasks_removed,
        })
    }

    async fn list_columns(&self, board_id: Uuid) -> StoreResult<Vec<Column>> {
        Ok(self.tables.read().await.columns_of(board_id))
    }

    async fn find_column(&self, id: Uuid) -> StoreResult<Option<Column>> {
        Ok(self.tables.read().await.columns.get(&id).cloned())
    }

    async fn append_column(&self, data: CreateColumn) -> StoreResult<Column> {
        let mut tables = self.tables.write().await;

        if !tables.boards.contains_key(&data.board_id) {
            return Err(StoreError::NotFound("board"));
        }

        let order = tables
            .columns
            .values()
            .filter(|c| c.board_id == data.board_id)
            .count() as i32;

        let column = Column {
            id: Uuid::new_v4(),
            name: data.name,
            board_id: data.board_id,
            order,
            created_at: tables.now(),
        };
        tables.columns.insert(column.id, column.clone());

        Ok(column)
    }

    async fn delete_column(&self, id: Uuid) -> StoreResult<ColumnRemoval> {
        let mut tables = self.tables.write().await;

        let board_id = tables
            .columns
            .get(&id)
            .map(|c| c.board_id)
            .ok_or(StoreError::NotFound("column"))?;

        let before = tables.tasks.len();
        tables.tasks.retain(|_, t| t.column_id != id);
        let tasks_removed = (before - tables.tasks.len()) as u64;

        let column = tables
            .columns
            .remove(&id)
            .ok_or(StoreError::NotFound("column"))?;

        if self.policy.is_dense() {
            let remaining: Vec<Ranked> = tables.columns_of(board_id).iter().map(Ranked::from).collect();
            let changes = ranking::compact(&remaining);
            tables.apply_column_ranks(&changes);
        }

        Ok(ColumnRemoval {
            column,
            tasks_removed,
        })
    }

    async fn list_tasks(&self, board_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(self.tables.read().await.tasks_where(|t| t.board_id == board_id))
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn append_task(&self, data: CreateTask, owner_id: Uuid) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.boards.contains_key(&data.board_id) {
            return Err(StoreError::NotFound("board"));
        }
        if !tables.columns.contains_key(&data.column_id) {
            return Err(StoreError::NotFound("column"));
        }

        let order = tables
            .tasks
            .values()
            .filter(|t| t.column_id == data.column_id)
            .count() as i32;

        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            column_id: data.column_id,
            board_id: data.board_id,
            owner_id,
            order,
            created_at: tables.now(),
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let task = tables.tasks.get_mut(&id).ok_or(StoreError::NotFound("task"))?;

        if let Some(title) = data.title {
            task.title = title;
        }
        if let Some(description) = data.description {
            task.description = Some(description);
        }

        Ok(task.clone())
    }

    async fn move_task(&self, id: Uuid, destination: MoveTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        let source_column = tables
            .tasks
            .get(&id)
            .map(|t| t.column_id)
            .ok_or(StoreError::NotFound("task"))?;

        if !tables.columns.contains_key(&destination.column_id) {
            return Err(StoreError::NotFound("column"));
        }

        let order = if self.policy.is_dense() {
            let siblings = tables.ranked_tasks_in(destination.column_id, id);
            let vacated = (source_column != destination.column_id)
                .then(|| tables.ranked_tasks_in(source_column, id));
            let plan = ranking::plan_move(&siblings, vacated.as_deref(), destination.order);
            tables.apply_task_ranks(&plan.changes);
            plan.order
        } else {
            destination.order
        };

        let task = tables.tasks.get_mut(&id).ok_or(StoreError::NotFound("task"))?;
        task.column_id = destination.column_id;
        task.order = order;

        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let task = tables.tasks.remove(&id).ok_or(StoreError::NotFound("task"))?;

        if self.policy.is_dense() {
            let remaining = tables.ranked_tasks_in(task.column_id, task.id);
            let changes = ranking::compact(&remaining);
            tables.apply_task_ranks(&changes);
        }

        Ok(task)
    }
}
