//! Render endpoint.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thumbs_cache::{RenderOutcome, RenderRequest};
use tracing::{debug, error};

use crate::state::AppState;

/// `GET /lt_cache/{action}/{geometry}/{*source_path}`
pub async fn render(
    State(state): State<Arc<AppState>>,
    Path((action, geometry, source_path)): Path<(String, String, String)>,
) -> Response {
    let request = RenderRequest::new(action, geometry, source_path);

    match state.cache.get(&request).await {
        Ok(RenderOutcome::Image {
            bytes,
            content_type,
            status,
        }) => {
            debug!(source = %request.source_path, status = ?status, "Serving image");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CACHE_CONTROL, cache_control(state.max_age)),
                ],
                Body::from(bytes),
            )
                .into_response()
        }
        Ok(RenderOutcome::NotFound(status)) => {
            debug!(source = %request.source_path, status = ?status, "Image not found");
            not_found(state.not_found_max_age)
        }
        Err(e) if e.is_not_found() => not_found(state.not_found_max_age),
        Err(e) => {
            error!(
                action = %request.action,
                geometry = %request.geometry,
                source = %request.source_path,
                error = %e,
                "Render request failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CACHE_CONTROL, cache_control(0))],
                e.to_string(),
            )
                .into_response()
        }
    }
}

fn not_found(max_age: u64) -> Response {
    (
        StatusCode::NOT_FOUND,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CACHE_CONTROL, cache_control(max_age)),
        ],
        Body::empty(),
    )
        .into_response()
}

fn cache_control(max_age: u64) -> String {
    format!("public, max-age={}", max_age)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_control_format() {
        assert_eq!(cache_control(60), "public, max-age=60");
        assert_eq!(cache_control(0), "public, max-age=0");
    }
}
