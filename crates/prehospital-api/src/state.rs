use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use prehospital_auth::lockout::LockoutPolicy;
use prehospital_auth::session::SessionKeys;
use prehospital_core::limits::IntakeLimits;
use prehospital_storage::rate_limits::RatePolicy;

use crate::config::Config;
use crate::error::ApiError;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub keys: SessionKeys,
    pub session_ttl: jiff::SignedDuration,
    pub limits: IntakeLimits,
    pub lockout: LockoutPolicy,
    pub login_policy: RatePolicy,
}

impl AppState {
    pub fn new(conn: Connection, config: &Config) -> eyre::Result<Self> {
        let keys = SessionKeys::from_secret(config.session_secret.as_bytes())?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            keys,
            session_ttl: config.session_ttl,
            limits: config.limits,
            lockout: LockoutPolicy::default(),
            login_policy: RatePolicy::per_hour(config.login_attempts_per_hour),
        })
    }

    pub fn submission_policy(&self) -> RatePolicy {
        RatePolicy::per_day(self.limits.max_submissions_per_day)
    }

    /// Run `f` against the database on the blocking pool, holding the
    /// connection lock for the whole call.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let mut conn = self.db.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut conn))
            .await
            .map_err(|e| ApiError::Internal(format!("database task failed: {e}")))?
    }
}
