//! Render cache: validation, lookup, render-on-miss and persistence.

use crate::metadata::MemoryMetadataCache;
use crate::storage::FilesystemStorage;
use crate::types::{CachePolicy, CacheStats, CacheStatus, RenderOutcome, RenderRequest};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thumbs_core::path::validate_relative_path;
use thumbs_core::ports::{MetadataCache, Storage};
use thumbs_core::{CacheKey, Error, Geometry, RenderRecord, Result, ThumbsConfig};
use thumbs_render::{Action, ActionRegistry, RenderPool, content_type};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    negative_hits: AtomicU64,
    misses: AtomicU64,
    renders: AtomicU64,
    failures: AtomicU64,
    rejected: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Serves rendered images, rendering and caching them on first request.
///
/// Concurrent misses for one key are coalesced: the first request renders,
/// the rest wait on a per-key lock and then find the stored result.
pub struct RenderCache {
    sources: Arc<dyn Storage>,
    renders: Arc<dyn Storage>,
    metadata: Arc<dyn MetadataCache>,
    registry: ActionRegistry,
    pool: RenderPool,
    policy: CachePolicy,
    locks: DashMap<CacheKey, Arc<Mutex<()>>>,
    counters: Counters,
}

impl RenderCache {
    pub fn new(
        sources: Arc<dyn Storage>,
        renders: Arc<dyn Storage>,
        metadata: Arc<dyn MetadataCache>,
        registry: ActionRegistry,
        pool: RenderPool,
        policy: CachePolicy,
    ) -> Self {
        Self {
            sources,
            renders,
            metadata,
            registry,
            pool,
            policy,
            locks: DashMap::new(),
            counters: Counters::default(),
        }
    }

    /// Filesystem storage and an in-process metadata cache, per `config`.
    pub fn from_config(config: &ThumbsConfig, registry: ActionRegistry) -> Self {
        Self::new(
            Arc::new(FilesystemStorage::new(config.source_root.clone())),
            Arc::new(FilesystemStorage::new(config.storage_root.clone())),
            Arc::new(MemoryMetadataCache::new()),
            registry,
            RenderPool::new(config.max_concurrent_renders, config.render_timeout()),
            CachePolicy::from(config),
        )
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn stats(&self) -> CacheStats {
        let c = &self.counters;
        CacheStats {
            hits: c.hits.load(Ordering::Relaxed),
            negative_hits: c.negative_hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            renders: c.renders.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
        }
    }

    /// Resolve a request to image bytes or "not found".
    ///
    /// Errors are reserved for render and storage failures; every invalid
    /// or missing input comes back as [`RenderOutcome::NotFound`].
    pub async fn get(&self, request: &RenderRequest) -> Result<RenderOutcome> {
        let (action, geometry) = match self.validate(request) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(error = %e, "Rejected render request");
                bump(&self.counters.rejected);
                return Ok(RenderOutcome::NotFound(CacheStatus::Rejected));
            }
        };

        let key = CacheKey::derive(&request.source_path, &request.action, &geometry.canonical());

        let status = match self.lookup(&key).await {
            Some(record) if record.negative => {
                bump(&self.counters.negative_hits);
                return Ok(RenderOutcome::NotFound(CacheStatus::NegativeHit));
            }
            Some(record) => match self.open_rendered(&record.rendered_path).await {
                Some(bytes) => {
                    bump(&self.counters.hits);
                    return Ok(image(bytes, CacheStatus::Hit));
                }
                None => CacheStatus::Stale,
            },
            None => CacheStatus::Miss,
        };

        let slot = KeyLock::new(&self.locks, &key);
        let _guard = slot.lock().await;
        self.resolve(&key, request, action, geometry, status).await
    }

    fn validate(&self, request: &RenderRequest) -> Result<(Arc<dyn Action>, Geometry)> {
        validate_relative_path(&request.source_path)?;
        let action = self.registry.get(&request.action)?;
        let geometry = Geometry::parse(&request.action, &request.geometry)?;

        let max = self.policy.max_dimension;
        if geometry.width.is_some_and(|w| w > max) || geometry.height.is_some_and(|h| h > max) {
            return Err(Error::InvalidGeometry(format!(
                "{} exceeds the {} pixel limit",
                request.geometry, max
            )));
        }

        Ok((action, geometry))
    }

    /// Runs with the key's lock held.
    async fn resolve(
        &self,
        key: &CacheKey,
        request: &RenderRequest,
        action: Arc<dyn Action>,
        geometry: Geometry,
        status: CacheStatus,
    ) -> Result<RenderOutcome> {
        // Whoever held the lock before us may have resolved the key already.
        match self.lookup(key).await {
            Some(record) if record.negative => {
                bump(&self.counters.negative_hits);
                return Ok(RenderOutcome::NotFound(CacheStatus::NegativeHit));
            }
            Some(record) => {
                if let Some(bytes) = self.open_rendered(&record.rendered_path).await {
                    bump(&self.counters.hits);
                    return Ok(image(bytes, CacheStatus::Hit));
                }
            }
            None => {}
        }

        bump(&self.counters.misses);

        let source = match self.read_source(&request.source_path).await {
            Ok(bytes) => bytes,
            Err(e @ Error::SourceMissing(_)) => {
                info!(error = %e, "Caching not-found");
                self.remember(key, &RenderRecord::not_found(), self.policy.not_found_ttl)
                    .await;
                return Ok(RenderOutcome::NotFound(status));
            }
            Err(e) => return Err(e),
        };

        let bytes = match self.pool.render(action, source, geometry).await {
            Ok(bytes) => bytes,
            Err(e) => {
                bump(&self.counters.failures);
                warn!(
                    action = %request.action,
                    source = %request.source_path,
                    error = %e,
                    "Render failed"
                );
                return Err(e);
            }
        };

        let rendered_path = key.storage_path();
        if let Err(e) = self.renders.save(&rendered_path, &bytes).await {
            bump(&self.counters.failures);
            warn!(path = %rendered_path, error = %e, "Failed to store render");
            return Err(match e {
                Error::StorageWrite(_) => e,
                other => Error::StorageWrite(other.to_string()),
            });
        }

        self.remember(key, &RenderRecord::rendered(rendered_path), self.policy.render_ttl)
            .await;
        bump(&self.counters.renders);

        info!(
            action = %request.action,
            geometry = %geometry,
            source = %request.source_path,
            key = %key,
            size = bytes.len(),
            "Rendered image"
        );

        Ok(image(bytes, status))
    }

    async fn read_source(&self, path: &str) -> Result<Vec<u8>> {
        if !self.sources.exists(path).await? {
            return Err(Error::SourceMissing(path.to_string()));
        }
        self.sources
            .open(path)
            .await?
            .ok_or_else(|| Error::SourceMissing(path.to_string()))
    }

    /// Metadata lookup; an unavailable backend reads as a miss.
    async fn lookup(&self, key: &CacheKey) -> Option<RenderRecord> {
        match self.metadata.get(&key.metadata_key()).await {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "Metadata cache unavailable, rendering");
                None
            }
        }
    }

    async fn remember(&self, key: &CacheKey, record: &RenderRecord, ttl: Duration) {
        if let Err(e) = self.metadata.set(&key.metadata_key(), record, ttl).await {
            warn!(key = %key, error = %e, "Failed to store render record");
        }
    }

    async fn open_rendered(&self, path: &str) -> Option<Vec<u8>> {
        match self.renders.open(path).await {
            Ok(Some(bytes)) => Some(bytes),
            Ok(None) => {
                info!(path = %path, "Rendered asset missing, re-rendering");
                None
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Rendered asset unreadable, re-rendering");
                None
            }
        }
    }
}

/// Holds a key's slot in the lock map and drops the entry once the last
/// holder is gone, including when the request future is cancelled.
struct KeyLock<'a> {
    locks: &'a DashMap<CacheKey, Arc<Mutex<()>>>,
    key: CacheKey,
    lock: Option<Arc<Mutex<()>>>,
}

impl<'a> KeyLock<'a> {
    fn new(locks: &'a DashMap<CacheKey, Arc<Mutex<()>>>, key: &CacheKey) -> Self {
        let lock = locks.entry(key.clone()).or_default().clone();
        Self {
            locks,
            key: key.clone(),
            lock: Some(lock),
        }
    }

    async fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for KeyLock<'_> {
    fn drop(&mut self) {
        self.lock.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn image(bytes: Vec<u8>, status: CacheStatus) -> RenderOutcome {
    RenderOutcome::Image {
        content_type: content_type(&bytes),
        bytes,
        status,
    }
}
