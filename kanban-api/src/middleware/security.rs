/// Security response headers
///
/// The API only serves JSON, so the content policy forbids everything and
/// framing is denied. HSTS is added only in production, where the service is
/// expected to sit behind TLS.
///
/// # Headers Applied
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: no-referrer`
/// - `Content-Security-Policy: default-src 'none'; frame-ancestors 'none'`
/// - `Strict-Transport-Security` (production only)
///
/// # Example
///
/// ```
/// use axum::{middleware::from_fn_with_state, routing::get, Router};
/// use kanban_api::middleware::security::{security_headers, SecurityHeaders};
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(from_fn_with_state(SecurityHeaders { hsts: true }, security_headers));
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Options for [`security_headers`]
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeaders {
    /// Send `Strict-Transport-Security`
    pub hsts: bool,
}

/// Adds security headers to every response
pub async fn security_headers(
    State(options): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    if options.hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    async fn headers_for(hsts: bool) -> axum::http::HeaderMap {
        let app = Router::new()
            .route("/test", get(|| async { "test" }))
            .layer(from_fn_with_state(SecurityHeaders { hsts }, security_headers));

        let response = app
            .oneshot(http::Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        response.headers().clone()
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let headers = headers_for(false).await;

        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
        assert!(headers.get("Content-Security-Policy").is_some());
        assert!(headers.get("Strict-Transport-Security").is_none());
    }

    #[tokio::test]
    async fn test_hsts_enabled_in_production() {
        let headers = headers_for(true).await;
        assert!(headers.get("Strict-Transport-Security").is_some());
    }
}
