/// Task model and database operations
///
/// A task is a unit of work sitting in exactly one column at a time. It has no
/// status field: the column it sits in *is* its status, and any task may move
/// to any column.
///
/// Tasks are owned by a user (`owner_id`), independently of the board they
/// sit on. Edit, move and delete are authorized against that owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT,
///     column_id UUID NOT NULL REFERENCES columns(id),
///     board_id UUID NOT NULL REFERENCES boards(id),
///     owner_id UUID NOT NULL REFERENCES users(id),
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
///
/// CREATE INDEX idx_tasks_column ON tasks(column_id);
/// CREATE INDEX idx_tasks_board ON tasks(board_id);
/// CREATE INDEX idx_tasks_owner ON tasks(owner_id);
/// ```
///
/// # Example
///
/// ```no_run
/// use kanban_shared::models::task::{Task, CreateTask};
/// use sqlx::PgConnection;
/// use uuid::Uuid;
///
/// # async fn example(conn: &mut PgConnection, board_id: Uuid, column_id: Uuid, owner: Uuid) -> Result<(), sqlx::Error> {
/// let order = Task::count_by_column(conn, column_id).await? as i32;
/// let task = Task::create(conn, CreateTask {
///     title: "Fix bug".to_string(),
///     description: None,
///     column_id,
///     board_id,
/// }, owner, order).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Unit of work on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Column the task currently sits in
    pub column_id: Uuid,

    /// Board the task was created on
    pub board_id: Uuid,

    /// User who owns the task
    pub owner_id: Uuid,

    /// Rank within the column
    #[sqlx(rename = "position")]
    pub order: i32,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Short title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Column to append to
    pub column_id: Uuid,

    /// Board the task belongs to
    pub board_id: Uuid,
}

/// Partial edit of a task; only `Some` fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl UpdateTask {
    /// True when the edit carries no field at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Destination of a task move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTask {
    /// Destination column
    pub column_id: Uuid,

    /// Requested rank in the destination column
    pub order: i32,
}

const TASK_COLUMNS: &str = "id, title, description, column_id, board_id, owner_id, position, created_at";

impl Task {
    /// Inserts a task at an explicit rank
    pub async fn create(
        conn: &mut PgConnection,
        data: CreateTask,
        owner_id: Uuid,
        order: i32,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (id, title, description, column_id, board_id, owner_id, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(Uuid::new_v4())
            .bind(data.title)
            .bind(data.description)
            .bind(data.column_id)
            .bind(data.board_id)
            .bind(owner_id)
            .bind(order)
            .fetch_one(&mut *conn)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(task)
    }

    /// Lists a board's tasks by rank
    ///
    /// Ranks are only meaningful within a column; callers regroup by
    /// `column_id`.
    pub async fn list_by_board(
        conn: &mut PgConnection,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE board_id = $1 ORDER BY position ASC, created_at ASC, id ASC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(board_id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(tasks)
    }

    /// Lists a column's tasks by rank
    pub async fn list_by_column(
        conn: &mut PgConnection,
        column_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE column_id = $1 ORDER BY position ASC, created_at ASC, id ASC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(column_id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(tasks)
    }

    /// Counts the tasks in a column
    pub async fn count_by_column(conn: &mut PgConnection, column_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE column_id = $1")
            .bind(column_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }

    /// Applies a partial edit
    ///
    /// Returns `None` if the task doesn't exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(conn, id).await;
        }

        let mut sets = Vec::new();
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }

        let query = format!(
            "UPDATE tasks SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            TASK_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let task = q.fetch_optional(&mut *conn).await?;

        Ok(task)
    }

    /// Overwrites a task's column and rank
    pub async fn set_placement(
        conn: &mut PgConnection,
        id: Uuid,
        column_id: Uuid,
        order: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET column_id = $2, position = $3 WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(column_id)
            .bind(order)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(task)
    }

    /// Rewrites a task's rank only
    pub async fn set_order(conn: &mut PgConnection, id: Uuid, order: i32) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tasks SET position = $2 WHERE id = $1")
            .bind(id)
            .bind(order)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Deletes one task
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task sitting in a column
    pub async fn delete_by_column(conn: &mut PgConnection, column_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE column_id = $1")
            .bind(column_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every task under a board
    ///
    /// Covers tasks created on the board and tasks moved into one of its
    /// columns from elsewhere, so no task is left pointing at a deleted column.
    pub async fn delete_by_board(conn: &mut PgConnection, board_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE board_id = $1
               OR column_id IN (SELECT id FROM columns WHERE board_id = $1)
            "#,
        )
        .bind(board_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());
        assert!(!UpdateTask {
            title: Some("New".to_string()),
            description: None,
        }
        .is_empty());
        assert!(!UpdateTask {
            title: None,
            description: Some(String::new()),
        }
        .is_empty());
    }

    #[test]
    fn test_task_json_shape() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "Fix bug".to_string(),
            description: None,
            column_id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            order: 0,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["title"], "Fix bug");
        assert_eq!(json["order"], 0);
        assert!(json["description"].is_null());
    }
}
