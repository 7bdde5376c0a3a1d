use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use prehospital_audit::actions;
use prehospital_audit::events::AuditEvent;
use prehospital_auth::authorize::require_owner_or_admin;
use prehospital_core::models::form::{FormRecord, FormSubmission, FormSummary};
use prehospital_core::models::page::{FormFilter, Page};
use prehospital_core::validation::validate_submission;
use prehospital_storage::forms;
use prehospital_storage::rate_limits::{self, RateDecision};

use crate::error::ApiError;
use crate::middleware::auth::AuthSession;
use crate::state::AppState;

const SUBMIT_ACTION: &str = "form_submit";

/// Records list. Non-admins only ever see their own forms.
pub async fn list_forms(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    query: Result<Query<FormFilter>, QueryRejection>,
) -> Result<Json<Page<FormSummary>>, ApiError> {
    let Query(mut filter) = query?;
    if !session.user.is_admin() {
        filter.created_by = Some(session.user.id);
    }

    let conn = state.db.lock().await;
    let page = forms::list(&conn, &filter)?;
    Ok(Json(page))
}

pub async fn get_form(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<FormRecord>, ApiError> {
    let Path(id) = path?;
    let conn = state.db.lock().await;
    let record = forms::get(&conn, id)?;
    require_owner_or_admin(&session.user, record.form.created_by)?;
    Ok(Json(record))
}

/// Create a form with its injuries.
///
/// Validation and both resource limits are checked before anything is
/// written. The form, the daily allowance and the audit entry commit
/// together or not at all.
pub async fn create_form(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    payload: Result<Json<FormSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<FormRecord>), ApiError> {
    let Json(submission) = payload?;
    let user_id = session.user.id;
    let validated = validate_submission(submission, &state.limits).inspect_err(|e| {
        tracing::warn!(user_id, error = %e, "form submission rejected");
    })?;

    let now = jiff::Timestamp::now();
    let policy = state.submission_policy();
    let limits = state.limits;

    let record = state
        .with_db(move |conn| {
            let actor = user_id.to_string();
            if let RateDecision::Limited { retry_after_secs } =
                rate_limits::check(conn, SUBMIT_ACTION, &actor, policy, now)?
            {
                tracing::warn!(user_id, "daily submission limit reached");
                return Err(ApiError::RateLimited {
                    message: format!(
                        "daily limit of {} submissions reached",
                        limits.max_submissions_per_day
                    ),
                    retry_after: retry_after_secs,
                });
            }

            let tx = conn.transaction()?;
            let record = forms::create(&tx, user_id, &validated, limits.max_injuries, now)?;
            rate_limits::record(&tx, SUBMIT_ACTION, &actor, policy, now)?;
            AuditEvent::new(actions::FORM_CREATE, actions::RESOURCE_FORM)
                .resource(record.form.id)
                .by(user_id)
                .with_details(json!({
                    "form_code": record.form.form_code,
                    "injuries": record.injuries.len(),
                }))
                .record(&tx, now)?;
            tx.commit()?;
            Ok(record)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Overwrite a form. Its injury list is replaced wholesale by the submitted one.
pub async fn update_form(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<FormSubmission>, JsonRejection>,
) -> Result<Json<FormRecord>, ApiError> {
    let Path(id) = path?;
    let Json(submission) = payload?;
    let user = session.user;
    let validated = validate_submission(submission, &state.limits).inspect_err(|e| {
        tracing::warn!(user_id = user.id, form_id = id, error = %e, "form update rejected");
    })?;

    let now = jiff::Timestamp::now();
    let max_injuries = state.limits.max_injuries;

    let record = state
        .with_db(move |conn| {
            let owner = forms::owner_of(conn, id)?;
            require_owner_or_admin(&user, owner)?;

            let tx = conn.transaction()?;
            let record = forms::update(&tx, id, &validated, max_injuries, now)?;
            AuditEvent::new(actions::FORM_UPDATE, actions::RESOURCE_FORM)
                .resource(id)
                .by(user.id)
                .with_details(json!({ "injuries": record.injuries.len() }))
                .record(&tx, now)?;
            tx.commit()?;
            Ok(record)
        })
        .await?;

    Ok(Json(record))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let now = jiff::Timestamp::now();
    let mut conn = state.db.lock().await;
    let owner = forms::owner_of(&conn, id)?;
    require_owner_or_admin(&session.user, owner)?;

    let tx = conn.transaction()?;
    forms::delete(&tx, id)?;
    AuditEvent::new(actions::FORM_DELETE, actions::RESOURCE_FORM)
        .resource(id)
        .by(session.user.id)
        .record(&tx, now)?;
    tx.commit()?;

    Ok(StatusCode::NO_CONTENT)
}
