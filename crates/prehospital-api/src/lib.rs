//! prehospital-api
//!
//! HTTP surface of the intake system: session login, the forms records
//! CRUD, and server-side injury marker placement.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

/// Build the application router.
///
/// Everything except `/health` and the login route requires a bearer
/// session; mutating routes additionally require the session's CSRF token.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/session", get(routes::session::current_session))
        .route(
            "/forms",
            get(routes::forms::list_forms).post(routes::forms::create_form),
        )
        .route(
            "/forms/{id}",
            get(routes::forms::get_form)
                .put(routes::forms::update_form)
                .delete(routes::forms::delete_form),
        )
        .route(
            "/forms/{id}/injuries/render",
            get(routes::injuries::render_injuries),
        )
        .layer(axum_mw::from_fn(middleware::csrf::require_csrf))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        // Health (no auth)
        .route("/health", get(routes::health::health_check))
        .route("/session", post(routes::session::login))
        .merge(protected)
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
