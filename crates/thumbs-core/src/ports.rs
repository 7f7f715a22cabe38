//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the render pipeline and its
//! storage backends.

use crate::Result;
use crate::record::RenderRecord;
use async_trait::async_trait;
use std::time::Duration;

/// Byte store addressed by relative paths.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check whether a path exists.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Read a file. `Ok(None)` means it is physically absent.
    async fn open(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Write a file atomically; readers never observe a partial write.
    async fn save(&self, path: &str, bytes: &[u8]) -> Result<()>;
}

/// Key/value store with per-entry TTL.
#[async_trait]
pub trait MetadataCache: Send + Sync {
    /// Look up a record. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<RenderRecord>>;

    /// Store a record, replacing any previous one.
    async fn set(&self, key: &str, record: &RenderRecord, ttl: Duration) -> Result<()>;
}
