/// Database layer
///
/// Connection pooling and schema migrations for the PostgreSQL backend. The
/// SQL for each table lives next to its row type in [`crate::models`].
///
/// # Example
///
/// ```no_run
/// use kanban_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod migrations;
pub mod pool;
