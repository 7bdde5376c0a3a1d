use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use prehospital_audit::error::AuditError;
use prehospital_auth::error::AuthError;
use prehospital_core::annotate::AnnotateError;
use prehospital_core::error::CoreError;
use prehospital_core::validation::{FieldError, SubmissionError};
use prehospital_storage::error::StorageError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Validation(Vec<FieldError>),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    TooManyInjuries { count: usize, max: usize },
    RateLimited { message: String, retry_after: u64 },
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut retry_after = None;
        let mut fields = Vec::new();
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Validation(errors) => {
                fields = errors;
                (StatusCode::BAD_REQUEST, "validation failed".to_string())
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::TooManyInjuries { count, max } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("too many injuries: {count} exceeds the maximum of {max}"),
            ),
            ApiError::RateLimited {
                message,
                retry_after: secs,
            } => {
                retry_after = Some(secs);
                (StatusCode::TOO_MANY_REQUESTS, message)
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let mut response = (
            status,
            Json(ErrorBody {
                error: message,
                fields,
            }),
        )
            .into_response();
        if let Some(secs) = retry_after
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} not found: {id}"))
            }
            StorageError::TooManyInjuries { count, max } => {
                ApiError::TooManyInjuries { count, max }
            }
            StorageError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::InvalidToken(_) => ApiError::Unauthorized(e.to_string()),
            AuthError::AccountLocked { .. }
            | AuthError::AccountInactive
            | AuthError::CsrfMismatch
            | AuthError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            AuthError::PasswordHash(_) | AuthError::WeakSecret { .. } | AuthError::Jwt(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::Invalid(fields) => ApiError::Validation(fields),
            SubmissionError::TooManyInjuries { count, max } => {
                ApiError::TooManyInjuries { count, max }
            }
        }
    }
}

impl From<AnnotateError> for ApiError {
    fn from(e: AnnotateError) -> Self {
        match e {
            AnnotateError::Serialization(msg) => ApiError::Internal(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidEnum { .. } => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuditError> for ApiError {
    fn from(e: AuditError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}
