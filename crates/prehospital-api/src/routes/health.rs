use axum::Json;
use axum::extract::State;
use serde::Serialize;

use prehospital_storage::db;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub schema_version: i64,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Health>, ApiError> {
    let conn = state.db.lock().await;
    Ok(Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        schema_version: db::current_version(&conn),
    }))
}
