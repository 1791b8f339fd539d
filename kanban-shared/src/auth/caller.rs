/// Caller identity
///
/// Every service call takes a [`Caller`]. The HTTP layer resolves it once per
/// request from the `Authorization` header with [`caller_from_authorization`];
/// nothing below that point looks at headers or tokens.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::caller::{caller_from_authorization, Caller};
///
/// let caller = caller_from_authorization(None, "secret").unwrap();
/// assert_eq!(caller, Caller::Anonymous);
/// ```

use serde::Serialize;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Who is making a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "lowercase")]
pub enum Caller {
    /// No credentials were presented
    Anonymous,

    /// A verified user
    User(Uuid),
}

impl Caller {
    /// The user ID, if any
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(*id),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Caller::Anonymous)
    }
}

/// Error type for credential resolution
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Header present but not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error(transparent)]
    InvalidToken(#[from] JwtError),
}

/// Resolves a caller from the raw `Authorization` header value
///
/// A missing header is [`Caller::Anonymous`]. A header that is present must
/// carry a valid bearer token; anything else is an error rather than a
/// silent downgrade to anonymous.
pub fn caller_from_authorization(header: Option<&str>, secret: &str) -> Result<Caller, AuthError> {
    let Some(value) = header else {
        return Ok(Caller::Anonymous);
    };

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("expected 'Bearer <token>'".to_string()))?;

    let claims = validate_token(token, secret)?;

    Ok(Caller::User(claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_missing_header_is_anonymous() {
        let caller = caller_from_authorization(None, SECRET).unwrap();
        assert!(caller.is_anonymous());
        assert_eq!(caller.user_id(), None);
    }

    #[test]
    fn test_bearer_token_resolves_user() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id, Duration::hours(1)), SECRET).unwrap();

        let caller = caller_from_authorization(Some(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(caller, Caller::User(user_id));
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(matches!(
            caller_from_authorization(Some("Basic abc"), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            caller_from_authorization(Some("Bearer "), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(matches!(
            caller_from_authorization(Some("Bearer nope"), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
