//! Route definitions.

use axum::{Router, middleware as axum_middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, render};
use crate::middleware::request_id;
use crate::state::AppState;

/// Create the main router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/lt_cache/{action}/{geometry}/{*source_path}",
            get(render::render),
        )
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_id))
        .with_state(state)
}
