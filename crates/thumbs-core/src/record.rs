//! Render records stored in the metadata cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of resolving a cache key.
///
/// Either points at a rendered asset or asserts that the source is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRecord {
    /// Storage path of the rendered asset; empty for negative records.
    pub rendered_path: String,
    /// The source did not exist when the key was resolved.
    pub negative: bool,
    pub created_at: DateTime<Utc>,
}

impl RenderRecord {
    pub fn rendered(path: impl Into<String>) -> Self {
        Self {
            rendered_path: path.into(),
            negative: false,
            created_at: Utc::now(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            rendered_path: String::new(),
            negative: true,
            created_at: Utc::now(),
        }
    }
}
