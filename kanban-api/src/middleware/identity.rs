/// Caller resolution
///
/// Runs in front of every `/v1` route and inserts a
/// [`Caller`](kanban_shared::auth::caller::Caller) into the request
/// extensions. Handlers take it with `Extension<Caller>`.
///
/// A request without `Authorization` proceeds as anonymous. A request whose
/// header is present but unusable is rejected with 401 here.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use kanban_shared::auth::caller::caller_from_authorization;
use tracing::debug;

use crate::{app::AppState, error::ApiError};

pub async fn resolve_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = {
        let header = match request.headers().get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ApiError::Unauthorized("Authorization header is not valid ASCII".to_string())
            })?),
            None => None,
        };

        caller_from_authorization(header, state.jwt_secret())?
    };

    debug!(?caller, "Resolved caller");
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
