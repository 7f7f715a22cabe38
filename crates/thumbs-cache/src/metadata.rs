//! In-process metadata cache with per-entry TTL.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use thumbs_core::Result;
use thumbs_core::ports::MetadataCache;
use thumbs_core::record::RenderRecord;

struct Entry {
    record: RenderRecord,
    expires_at: Instant,
}

/// Metadata cache for single-instance deployments.
#[derive(Default)]
pub struct MemoryMetadataCache {
    entries: DashMap<String, Entry>,
}

impl MemoryMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl MetadataCache for MemoryMetadataCache {
    async fn get(&self, key: &str) -> Result<Option<RenderRecord>> {
        let now = Instant::now();
        let cached = self
            .entries
            .get(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.record.clone()));

        match cached {
            Some(Some(record)) => Ok(Some(record)),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, record: &RenderRecord, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                record: record.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
