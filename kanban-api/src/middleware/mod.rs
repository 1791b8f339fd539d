/// Middleware for the API server
///
/// - `identity`: resolves the caller from the bearer token
/// - `security`: security response headers

pub mod identity;
pub mod security;
