/// Column model and database operations
///
/// A column is a named lane inside a board. Its `order` is the rank within the
/// board, stored as `position` because `order` is reserved in SQL.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE columns (
///     id UUID PRIMARY KEY,
///     name TEXT NOT NULL,
///     board_id UUID NOT NULL REFERENCES boards(id),
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
///
/// CREATE INDEX idx_columns_board ON columns(board_id);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Ordered lane within a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    /// Unique column ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Board this column belongs to
    pub board_id: Uuid,

    /// Rank within the board
    #[sqlx(rename = "position")]
    pub order: i32,

    /// When the column was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumn {
    /// Board to append to
    pub board_id: Uuid,

    /// Display name
    pub name: String,
}

impl Column {
    /// Inserts a column at an explicit rank
    pub async fn create(
        conn: &mut PgConnection,
        data: CreateColumn,
        order: i32,
    ) -> Result<Self, sqlx::Error> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO columns (id, name, board_id, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, board_id, position, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.board_id)
        .bind(order)
        .fetch_one(&mut *conn)
        .await?;

        Ok(column)
    }

    /// Finds a column by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            SELECT id, name, board_id, position, created_at
            FROM columns
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(column)
    }

    /// Lists a board's columns by rank, oldest first on ties
    pub async fn list_by_board(
        conn: &mut PgConnection,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let columns = sqlx::query_as::<_, Column>(
            r#"
            SELECT id, name, board_id, position, created_at
            FROM columns
            WHERE board_id = $1
            ORDER BY position ASC, created_at ASC, id ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(columns)
    }

    /// Counts a board's columns
    pub async fn count_by_board(conn: &mut PgConnection, board_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM columns WHERE board_id = $1")
            .bind(board_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }

    /// Rewrites a column's rank
    pub async fn set_order(conn: &mut PgConnection, id: Uuid, order: i32) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE columns SET position = $2 WHERE id = $1")
            .bind(id)
            .bind(order)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Deletes one column row
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM columns WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every column of a board, returning how many were removed
    pub async fn delete_by_board(conn: &mut PgConnection, board_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM columns WHERE board_id = $1")
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
    fn test_order_serializes_as_order() {
        let column = Column {
            id: Uuid::new_v4(),
            name: "BACKLOG".to_string(),
            board_id: Uuid::new_v4(),
            order: 2,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["order"], 2);
        assert!(json.get("position").is_none());
    }
}
