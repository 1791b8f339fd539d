/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "postgres",
///   "rank_policy": "append"
/// }
/// ```
///
/// Returns 503 with `"status": "degraded"` when the store is unreachable.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::store::ranking::RankPolicy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub rank_policy: RankPolicy,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.store();

    let (code, status) = match store.health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage: store.backend().to_string(),
            rank_policy: store.rank_policy(),
        }),
    )
}
