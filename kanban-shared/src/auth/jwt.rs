/// JWT access tokens
///
/// Tokens are signed with HS256 and carry the user ID as `sub`. There is one
/// token type; its lifetime is set by the caller (the API reads it from
/// `JWT_EXPIRATION_HOURS`).
///
/// # Validation
///
/// - signature with the shared secret
/// - `exp` and `nbf`
/// - issuer must be [`ISSUER`]
///
/// # Example
///
/// ```
/// use kanban_shared::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "a-secret-of-at-least-thirty-two-bytes";
///
/// let token = create_token(&Claims::new(user_id, Duration::hours(24)), secret)?;
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `iss` claim
pub const ISSUER: &str = "kanban";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// `exp` is in the past
    #[error("Token has expired")]
    Expired,

    /// `iss` is not ours
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    /// Always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expires at (Unix seconds)
    pub exp: i64,

    /// Not before (Unix seconds)
    pub nbf: i64,
}

impl Claims {
    /// Claims for `user_id`, valid from now for `expires_in`
    pub fn new(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Verifies a token and returns its claims
///
/// # Errors
///
/// - [`JwtError::Expired`] when `exp` has passed
/// - [`JwtError::InvalidIssuer`] when `iss` doesn't match
/// - [`JwtError::ValidationError`] for everything else
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::hours(1));

        let token = create_token(&claims, SECRET).unwrap();
        let validated = validate_token(&token, SECRET).unwrap();

        assert_eq!(validated, claims);
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&Claims::new(Uuid::new_v4(), Duration::hours(1)), SECRET).unwrap();

        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let claims = Claims::new(Uuid::new_v4(), Duration::hours(-2));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_token("not.a.jwt", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }
}
