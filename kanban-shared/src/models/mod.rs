/// Database models for the kanban service
///
/// Each model carries its row type, its input types, and the SQL operations
/// the PostgreSQL store composes into transactions. The in-memory store in
/// [`crate::store::memory`] works on the same row types.
///
/// # Models
///
/// - `user`: identity owners of boards and tasks
/// - `board`: top-level containers, seeded with default columns
/// - `column`: ordered lanes within a board
/// - `task`: ordered units of work within a column
///
/// # Example
///
/// ```no_run
/// use kanban_shared::models::board::{Board, CreateBoard};
/// use kanban_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let mut conn = pool.acquire().await?;
///
/// let board = Board::create(&mut conn, CreateBoard {
///     name: "Sprint".to_string(),
///     owner_id: Uuid::new_v4(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod column;
pub mod task;
pub mod user;
