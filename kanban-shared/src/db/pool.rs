/// PostgreSQL connection pool
///
/// Builds a `PgPool` from [`DatabaseConfig`] and refuses to hand it out until
/// a `SELECT 1` round trip succeeds.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection pool settings
///
/// Timeouts are in seconds so they map directly onto environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Connections kept warm while idle
    pub min_connections: u32,

    /// How long an acquire may wait for a free connection
    pub acquire_timeout_seconds: u64,

    /// Idle connections older than this are closed; `None` keeps them
    pub idle_timeout_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
        }
    }
}

/// Connects a pool and verifies the database answers
///
/// # Errors
///
/// Returns an error if the URL is invalid, the server is unreachable, or the
/// health check fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database connection pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds));

    if let Some(idle) = config.idle_timeout_seconds {
        options = options.idle_timeout(Duration::from_secs(idle));
        debug!(idle_timeout_seconds = idle, "Set idle timeout");
    }

    let pool = options.connect(&config.url).await?;
    health_check(&pool).await?;

    info!("Database connection pool ready");
    Ok(pool)
}

/// Runs `SELECT 1` against the pool
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let (value,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if value != 1 {
        warn!(value, "Database health check returned unexpected value");
        return Err(sqlx::Error::Protocol(
            "health check returned unexpected value".into(),
        ));
    }

    debug!("Database health check passed");
    Ok(())
}

/// Closes every connection; call on shutdown
pub async fn close_pool(pool: PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
}
