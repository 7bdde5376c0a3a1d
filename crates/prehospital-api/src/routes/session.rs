use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use prehospital_audit::actions;
use prehospital_audit::events::AuditEvent;
use prehospital_auth::error::AuthError;
use prehospital_auth::password::verify_password;
use prehospital_auth::session::issue_session;
use prehospital_core::models::user::{CurrentUser, User, UserStatus};
use prehospital_storage::rate_limits::{self, RateDecision};
use prehospital_storage::users;

use crate::error::ApiError;
use crate::middleware::auth::AuthSession;
use crate::state::AppState;

const LOGIN_ACTION: &str = "login";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub csrf_token: String,
    pub expires_at: jiff::Timestamp,
    pub user: User,
}

/// Exchange a username and password for a signed session.
///
/// Attempts are rate limited per username; repeated bad passwords lock the
/// account for a while. Unknown usernames and wrong passwords get the same
/// answer.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let username = request.username.trim().to_string();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }
    let actor = username.to_lowercase();
    let now = jiff::Timestamp::now();

    let credential = {
        let conn = state.db.lock().await;
        if let RateDecision::Limited { retry_after_secs } =
            rate_limits::check(&conn, LOGIN_ACTION, &actor, state.login_policy, now)?
        {
            tracing::warn!(username = %actor, "login rate limit reached");
            return Err(ApiError::RateLimited {
                message: "too many login attempts, try again later".to_string(),
                retry_after: retry_after_secs,
            });
        }

        let Some(credential) = users::find_credentials(&conn, &username)? else {
            rate_limits::record(&conn, LOGIN_ACTION, &actor, state.login_policy, now)?;
            AuditEvent::new(actions::LOGIN_FAILED, actions::RESOURCE_SESSION)
                .with_details(json!({ "username": actor }))
                .record(&conn, now)?;
            tracing::warn!(username = %actor, "login for unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        if let Some(until) = state.lockout.locked_until(&credential.user, now) {
            AuditEvent::new(actions::LOGIN_LOCKED, actions::RESOURCE_SESSION)
                .by(credential.user.id)
                .record(&conn, now)?;
            return Err(AuthError::AccountLocked { until }.into());
        }
        credential
    };

    let password = request.password;
    let hash = credential.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password check failed: {e}")))??;

    let user = credential.user;
    let conn = state.db.lock().await;

    if !verified {
        let update = state.lockout.register_failure(&user, now);
        users::record_login_failure(&conn, user.id, update.failed_attempts, update.locked_until)?;
        rate_limits::record(&conn, LOGIN_ACTION, &actor, state.login_policy, now)?;
        AuditEvent::new(actions::LOGIN_FAILED, actions::RESOURCE_SESSION)
            .by(user.id)
            .with_details(json!({ "failed_attempts": update.failed_attempts }))
            .record(&conn, now)?;
        tracing::warn!(
            user_id = user.id,
            failed_attempts = update.failed_attempts,
            "login failed"
        );
        return Err(AuthError::InvalidCredentials.into());
    }

    if user.status != UserStatus::Active {
        tracing::warn!(user_id = user.id, "login by inactive user");
        return Err(AuthError::AccountInactive.into());
    }

    users::record_login_success(&conn, user.id, now)?;
    rate_limits::reset(&conn, LOGIN_ACTION, &actor)?;

    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
    };
    let issued = issue_session(&current, &state.keys, state.session_ttl, now)?;
    AuditEvent::new(actions::LOGIN, actions::RESOURCE_SESSION)
        .by(user.id)
        .record(&conn, now)?;

    let user = users::get_user(&conn, user.id)?;
    Ok(Json(LoginResponse {
        token: issued.token,
        csrf_token: issued.csrf_token,
        expires_at: issued.expires_at,
        user,
    }))
}

pub async fn current_session(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<User>, ApiError> {
    let conn = state.db.lock().await;
    let user = users::get_user(&conn, session.user.id)?;
    Ok(Json(user))
}
