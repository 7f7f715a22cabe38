//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;
use thumbs_cache::CacheStats;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub actions: Vec<String>,
    pub cache: StatsResponse,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub negative_hits: u64,
    pub misses: u64,
    pub renders: u64,
    pub failures: u64,
    pub rejected: u64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            negative_hits: stats.negative_hits,
            misses: stats.misses,
            renders: stats.renders,
            failures: stats.failures,
            rejected: stats.rejected,
        }
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        actions: state
            .cache
            .registry()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
        cache: state.cache.stats().into(),
    })
}

pub async fn ready() -> StatusCode {
    StatusCode::OK
}
