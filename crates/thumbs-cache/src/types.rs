//! Render cache types and requests.

use std::time::Duration;
use thumbs_core::ThumbsConfig;

/// Request to render (or fetch) a transformed image.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Action name, e.g. `thumbnail`.
    pub action: String,
    /// Raw geometry string, e.g. `100x50`.
    pub geometry: String,
    /// Source path relative to the source root.
    pub source_path: String,
}

impl RenderRequest {
    pub fn new(
        action: impl Into<String>,
        geometry: impl Into<String>,
        source_path: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            geometry: geometry.into(),
            source_path: source_path.into(),
        }
    }
}

/// How a request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a stored render.
    Hit,
    /// A negative record answered the request.
    NegativeHit,
    /// Nothing cached; the source was checked (and rendered if present).
    Miss,
    /// A positive record pointed at a missing asset; re-rendered.
    Stale,
    /// Rejected before any cache or storage access.
    Rejected,
}

/// Result of a render request.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Image {
        bytes: Vec<u8>,
        content_type: &'static str,
        status: CacheStatus,
    },
    NotFound(CacheStatus),
}

impl RenderOutcome {
    pub fn status(&self) -> CacheStatus {
        match self {
            RenderOutcome::Image { status, .. } => *status,
            RenderOutcome::NotFound(status) => *status,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RenderOutcome::Image { .. })
    }
}

/// TTLs for render records and the request size limit.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub render_ttl: Duration,
    pub not_found_ttl: Duration,
    /// Requests asking for a larger width or height are rejected.
    pub max_dimension: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from(&ThumbsConfig::default())
    }
}

impl From<&ThumbsConfig> for CachePolicy {
    fn from(config: &ThumbsConfig) -> Self {
        Self {
            render_ttl: config.render_ttl(),
            not_found_ttl: config.not_found_ttl(),
            max_dimension: config.max_dimension,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub negative_hits: u64,
    pub misses: u64,
    pub renders: u64,
    pub failures: u64,
    pub rejected: u64,
}
