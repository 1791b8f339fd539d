/// API route handlers
///
/// - `health`: liveness and store connectivity
/// - `auth`: register and login
/// - `boards`, `columns`, `tasks`: the kanban resources

pub mod auth;
pub mod boards;
pub mod columns;
pub mod health;
pub mod tasks;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body returned by every create endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}
