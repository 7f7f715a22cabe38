//! Application state shared across handlers.

use std::sync::Arc;
use thumbs_cache::RenderCache;
use thumbs_core::ThumbsConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RenderCache>,
    /// `max-age` for served images, in seconds.
    pub max_age: u64,
    /// `max-age` for not-found responses, in seconds.
    pub not_found_max_age: u64,
}

impl AppState {
    pub fn new(cache: Arc<RenderCache>, max_age: u64, not_found_max_age: u64) -> Self {
        Self {
            cache,
            max_age,
            not_found_max_age,
        }
    }

    pub fn from_config(config: &ThumbsConfig, cache: Arc<RenderCache>) -> Self {
        Self::new(cache, config.max_age_secs, config.not_found_max_age_secs)
    }
}
