//! # Kanban API Server
//!
//! Multi-board kanban backend: users, boards, ranked columns and ranked
//! tasks behind a JSON API.
//!
//! ## Usage
//!
//! ```bash
//! STORAGE_BACKEND=memory JWT_SECRET=$(openssl rand -hex 32) cargo run -p kanban-api
//! ```

use anyhow::Context;
use kanban_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StorageBackend},
};
use kanban_shared::{
    db::{migrations::run_migrations, pool},
    store::{memory::MemoryStore, postgres::PgStore, KanbanStore},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "Kanban API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let (store, pg_pool) = open_store(&config).await?;

    tracing::info!(
        backend = store.backend(),
        rank_policy = %store.rank_policy(),
        "Store ready"
    );

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pg_pool) = pg_pool {
        pool::close_pool(pg_pool).await;
    }

    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kanban_api=debug,kanban_shared=debug,tower_http=debug".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Builds the configured store; the pool is returned so it can be closed on exit
async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn KanbanStore>, Option<PgPool>)> {
    let policy = config.storage.rank_policy;

    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok((Arc::new(MemoryStore::new(policy)), None))
        }
        StorageBackend::Postgres => {
            let database = config
                .storage
                .database
                .as_ref()
                .context("DATABASE_URL is required for the postgres backend")?;

            let pg_pool = pool::create_pool(pool::DatabaseConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                ..Default::default()
            })
            .await
            .context("Failed to connect to database")?;

            run_migrations(&pg_pool)
                .await
                .context("Failed to run migrations")?;

            Ok((Arc::new(PgStore::new(pg_pool.clone(), policy)), Some(pg_pool)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
