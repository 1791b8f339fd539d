/// Application state and router builder
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use kanban_api::{app::{build_router, AppState}, config::Config};
/// use kanban_shared::store::memory::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_lookup(|key| match key {
///     "STORAGE_BACKEND" => Some("memory".to_string()),
///     "JWT_SECRET" => Some("a-secret-of-at-least-thirty-two-bytes".to_string()),
///     _ => None,
/// })?;
///
/// let store = Arc::new(MemoryStore::new(config.storage.rank_policy));
/// let app = build_router(AppState::new(store, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        identity::resolve_caller,
        security::{security_headers, SecurityHeaders},
    },
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use chrono::Duration;
use kanban_shared::{services::Kanban, store::KanbanStore};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; both fields are reference counted.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Kanban operations over the configured store
    pub kanban: Kanban,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn KanbanStore>, config: Config) -> Self {
        Self {
            kanban: Kanban::new(store),
            config: Arc::new(config),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn KanbanStore> {
        self.kanban.store()
    }

    /// JWT secret for signing and verifying access tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Access token lifetime
    pub fn token_lifetime(&self) -> Duration {
        Duration::hours(self.config.jwt.expiration_hours)
    }
}

/// Builds the complete router
///
/// ```text
/// /health                         GET
/// /v1/auth/register               POST
/// /v1/auth/login                  POST
/// /v1/boards                      GET, POST
/// /v1/boards/:id                  GET, DELETE
/// /v1/boards/:id/columns          GET, POST
/// /v1/boards/:id/tasks            GET
/// /v1/boards/:id/view             GET
/// /v1/columns/:id                 DELETE
/// /v1/tasks                       POST
/// /v1/tasks/:id                   PATCH, DELETE
/// /v1/tasks/:id/move              POST
/// ```
///
/// Every `/v1` route except `/v1/auth` runs behind [`resolve_caller`]. Outermost to innermost
/// the stack is security headers, CORS, compression, then request tracing.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let board_routes = Router::new()
        .route("/", get(routes::boards::list_boards).post(routes::boards::create_board))
        .route("/:id", get(routes::boards::get_board).delete(routes::boards::delete_board))
        .route(
            "/:id/columns",
            get(routes::columns::list_columns).post(routes::columns::create_column),
        )
        .route("/:id/tasks", get(routes::tasks::list_tasks))
        .route("/:id/view", get(routes::boards::view_board));

    let column_routes = Router::new().route("/:id", delete(routes::columns::delete_column));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route(
            "/:id",
            patch(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/:id/move", post(routes::tasks::move_task));

    let resource_routes = Router::new()
        .nest("/boards", board_routes)
        .nest("/columns", column_routes)
        .nest("/tasks", task_routes)
        .layer(from_fn_with_state(state.clone(), resolve_caller));

    // Auth stays outside caller resolution so a stale token never blocks login
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(resource_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(from_fn_with_state(
            SecurityHeaders {
                hsts: state.config.api.production,
            },
            security_headers,
        ))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
