use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use prehospital_auth::error::AuthError;
use prehospital_auth::session::validate_session;
use prehospital_core::models::user::{CurrentUser, UserStatus};
use prehospital_storage::error::StorageError;
use prehospital_storage::users;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated session, available to handlers as an extension.
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub user: CurrentUser,
    pub csrf: String,
}

/// Session validation middleware.
///
/// Extracts the `Authorization: Bearer <token>` header, validates the signed
/// session and checks that the account is still active. On success, inserts
/// [`AuthSession`] into request extensions for handlers to use.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))?;

    let claims = validate_session(token, &state.keys, jiff::Timestamp::now())?;
    let user = claims.current_user()?;

    {
        let conn = state.db.lock().await;
        let stored = match users::get_user(&conn, user.id) {
            Ok(stored) => stored,
            Err(StorageError::NotFound { .. }) => {
                return Err(AuthError::InvalidToken("unknown user".to_string()).into());
            }
            Err(e) => return Err(e.into()),
        };
        if stored.status != UserStatus::Active {
            return Err(AuthError::AccountInactive.into());
        }
    }

    req.extensions_mut().insert(AuthSession {
        user,
        csrf: claims.csrf,
    });

    Ok(next.run(req).await)
}
