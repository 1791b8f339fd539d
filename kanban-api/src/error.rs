/// Error handling for the API server
///
/// Every handler returns [`ApiResult`]. [`ApiError`] renders as a JSON body
/// `{error, message, details?}` with the matching status code, and the
/// `From` impls below map each library error onto it.
///
/// | Source | Status |
/// |---|---|
/// | `KanbanError::Unauthenticated`, bad token | 401 |
/// | `KanbanError::NotFound` | 404 |
/// | `StoreError::Conflict` | 409 |
/// | `validator` failures, weak password | 422 |
/// | storage failures | 500, logged, details hidden |
///
/// # Example
///
/// ```
/// use kanban_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Board not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kanban_shared::{
    auth::{caller::AuthError, jwt::JwtError, password::PasswordError},
    services::KanbanError,
    store::StoreError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Unprocessable entity (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "not_found")
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code this error renders with
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Logged here, never sent to the client
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

fn capitalize(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert kanban service errors to API errors
impl From<KanbanError> for ApiError {
    fn from(err: KanbanError) -> Self {
        match err {
            KanbanError::Unauthenticated => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            KanbanError::NotFound { entity } => {
                ApiError::NotFound(format!("{} not found", capitalize(entity)))
            }
            KanbanError::Store(err) => err.into(),
        }
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => {
                ApiError::NotFound(format!("{} not found", capitalize(entity)))
            }
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(err) => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert credential resolution errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidFormat(msg) => ApiError::Unauthorized(msg),
            AuthError::InvalidToken(err) => err.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(format!("Token creation failed: {}", msg)),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            JwtError::ValidationError(_) => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooWeak(message) => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "password".to_string(),
                message,
            }]),
            other => ApiError::InternalError(format!("Password operation failed: {}", other)),
        }
    }
}

/// Convert `validator` failures to a 422 with one detail per field error
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Board not found".to_string());
        assert_eq!(err.to_string(), "Not found: Board not found");
    }

    #[test]
    fn test_kanban_error_mapping() {
        let err: ApiError = KanbanError::Unauthenticated.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err: ApiError = KanbanError::NotFound { entity: "task" }.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found: Task not found");

        let err: ApiError = KanbanError::Store(StoreError::Conflict("Email already exists".into())).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = KanbanError::Store(StoreError::Database(sqlx::Error::PoolClosed)).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        let err: ApiError = AuthError::InvalidFormat("expected 'Bearer <token>'".into()).into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err: ApiError = AuthError::InvalidToken(JwtError::Expired).into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_weak_password_is_validation_error() {
        let err: ApiError = PasswordError::TooWeak("too short".into()).into();
        match err {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "password"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::InternalError("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "internal_error");
        assert!(!body.message.contains("connection refused"));
        assert!(body.details.is_none());
    }
}
