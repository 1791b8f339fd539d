/// Identity endpoints
///
/// The minimal register/login pair that mints access tokens for the board
/// API. There are no refresh tokens; clients log in again when a token
/// expires.
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Create a user and return a token
/// - `POST /v1/auth/login` - Exchange credentials for a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    auth::{jwt, password},
    models::user::CreateUser,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked further by `validate_password_strength`
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub user_id: Uuid,
    pub access_token: String,
}

/// Registers a new user
///
/// ```text
/// POST /v1/auth/register
/// {"email": "jane@example.com", "password": "hunter2hunter2", "name": "Jane"}
/// ```
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: invalid email or weak password
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    req.validate()?;
    password::validate_password_strength(&req.password)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = state
        .store()
        .create_user(CreateUser {
            email: req.email,
            password_hash,
            name: req.name,
        })
        .await?;

    let claims = jwt::Claims::new(user.id, state.token_lifetime());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            user_id: user.id,
            access_token,
        }),
    ))
}

/// Logs a user in
///
/// ```text
/// POST /v1/auth/login
/// {"email": "jane@example.com", "password": "hunter2hunter2"}
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .store()
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "Failed login attempt");
        return Err(invalid());
    }

    let claims = jwt::Claims::new(user.id, state.token_lifetime());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        user_id: user.id,
        access_token,
    }))
}
