use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use prehospital_auth::authorize::require_owner_or_admin;
use prehospital_core::annotate::{ImageGeometry, PlacedMarker, place_markers};
use prehospital_core::models::injury::BodyView;
use prehospital_storage::{forms, injuries};

use crate::error::ApiError;
use crate::middleware::auth::AuthSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub view: BodyView,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Serialize)]
pub struct RenderedView {
    pub view: BodyView,
    pub width: f64,
    pub height: f64,
    pub markers: Vec<PlacedMarker>,
}

/// Pixel positions of a form's markers on one silhouette at a given size.
pub async fn render_injuries(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<RenderQuery>, QueryRejection>,
) -> Result<Json<RenderedView>, ApiError> {
    let Path(id) = path?;
    let Query(query) = query?;
    let geometry = ImageGeometry::new(query.width, query.height)?;

    let conn = state.db.lock().await;
    let owner = forms::owner_of(&conn, id)?;
    require_owner_or_admin(&session.user, owner)?;
    let markers = injuries::list_for_form(&conn, id)?;

    Ok(Json(RenderedView {
        view: query.view,
        width: geometry.width,
        height: geometry.height,
        markers: place_markers(&markers, query.view, geometry),
    }))
}
