/// User model and database operations
///
/// Users are the identity owners of boards and tasks. The kanban core only ever
/// sees a user's ID; the remaining fields exist so the API server can mint
/// identities through register/login.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     name TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use kanban_shared::models::user::{User, CreateUser};
/// use kanban_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let mut conn = pool.acquire().await?;
///
/// let user = User::create(&mut conn, CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("Jane Doe".to_string()),
/// }).await?;
///
/// let found = User::find_by_email(&mut conn, "user@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, stored lowercase
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (normalized with [`normalize_email`] before storage)
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,
}

/// Normalizes an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns a database error on unique violation of `email`.
    pub async fn create(conn: &mut PgConnection, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .bind(data.name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (normalized before lookup)
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
        assert_eq!(normalize_email("a@b.c"), "a@b.c");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("jane@example.com"));
    }
}
