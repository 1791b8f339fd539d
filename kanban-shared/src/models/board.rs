/// Board model and database operations
///
/// A board is the top-level container owned by exactly one user. Every column
/// and task under a board carries that board's ID.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY,
///     name TEXT NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
///
/// CREATE INDEX idx_boards_owner ON boards(owner_id);
/// ```
///
/// # Example
///
/// ```no_run
/// use kanban_shared::models::board::{Board, CreateBoard};
/// use sqlx::PgConnection;
/// use uuid::Uuid;
///
/// # async fn example(conn: &mut PgConnection, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let board = Board::create(conn, CreateBoard {
///     name: "Sprint".to_string(),
///     owner_id,
/// }).await?;
///
/// let mine = Board::list_by_owner(conn, owner_id).await?;
/// assert_eq!(mine[0].id, board.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Columns seeded into every new board, in rank order
pub const DEFAULT_COLUMNS: [&str; 3] = ["BACKLOG", "IN PROGRESS", "DONE"];

/// Board owned by a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Owning user
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Display name
    pub name: String,

    /// Owning user
    pub owner_id: Uuid,
}

impl Board {
    /// Checks whether `user_id` owns this board
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Inserts a board row (without default columns)
    pub async fn create(conn: &mut PgConnection, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (id, name, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.owner_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(board)
    }

    /// Finds a board by ID and locks its row until the transaction ends
    ///
    /// Every read-then-write rank computation under a board takes this lock
    /// first, so concurrent creates and moves on one board are serialized.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM boards
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(board)
    }

    /// Lists a user's boards, newest first
    pub async fn list_by_owner(
        conn: &mut PgConnection,
        owner_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM boards
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(boards)
    }

    /// Deletes the board row only
    ///
    /// Columns and tasks must already be gone; see `KanbanStore::delete_board`.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns() {
        assert_eq!(DEFAULT_COLUMNS, ["BACKLOG", "IN PROGRESS", "DONE"]);
    }

    #[test]
    fn test_is_owned_by() {
        let owner = Uuid::new_v4();
        let board = Board {
            id: Uuid::new_v4(),
            name: "Sprint".to_string(),
            owner_id: owner,
            created_at: Utc::now(),
        };

        assert!(board.is_owned_by(owner));
        assert!(!board.is_owned_by(Uuid::new_v4()));
    }
}
