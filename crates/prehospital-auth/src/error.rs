use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("account locked until {until}")]
    AccountLocked { until: jiff::Timestamp },

    #[error("account is inactive")]
    AccountInactive,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("CSRF token missing or mismatched")]
    CsrfMismatch,

    #[error("not permitted: {0}")]
    Forbidden(String),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error("session secret must be at least {min} bytes")]
    WeakSecret { min: usize },

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
