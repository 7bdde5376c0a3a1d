use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use prehospital_auth::csrf;

use crate::error::ApiError;
use crate::middleware::auth::AuthSession;

/// Require the session's CSRF token in `X-CSRF-Token` on mutating requests.
/// Must run inside [`require_auth`](crate::middleware::auth::require_auth).
pub async fn require_csrf(req: Request, next: Next) -> Result<Response, ApiError> {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(req).await);
    }

    let session = req
        .extensions()
        .get::<AuthSession>()
        .ok_or_else(|| ApiError::Internal("CSRF check ran without a session".to_string()))?;
    let presented = req
        .headers()
        .get(csrf::HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = csrf::verify(&session.csrf, presented) {
        tracing::warn!(
            user_id = session.user.id,
            method = %req.method(),
            path = req.uri().path(),
            "CSRF check failed"
        );
        return Err(e.into());
    }

    Ok(next.run(req).await)
}
