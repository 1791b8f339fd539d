/// Identity and access control
///
/// # Modules
///
/// - [`password`]: Argon2id hashing for the register/login pair
/// - [`jwt`]: HS256 access tokens
/// - [`caller`]: the per-request [`caller::Caller`] resolved from a bearer token
/// - [`authorization`]: ownership checks run before every store mutation
///
/// # Example
///
/// ```
/// use kanban_shared::auth::{caller::{caller_from_authorization, Caller}, jwt::{create_token, Claims}};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-of-at-least-thirty-two-bytes";
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id, Duration::hours(1)), secret)?;
///
/// let caller = caller_from_authorization(Some(&format!("Bearer {}", token)), secret)?;
/// assert_eq!(caller, Caller::User(user_id));
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod caller;
pub mod jwt;
pub mod password;
