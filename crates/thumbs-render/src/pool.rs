//! Bounded worker pool for CPU-bound renders.

use crate::action::Action;
use std::sync::Arc;
use std::time::Duration;
use thumbs_core::{Error, Geometry, Result};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Runs actions on the blocking thread pool, at most `max_concurrent` at a
/// time, each under a timeout.
pub struct RenderPool {
    permits: Semaphore,
    timeout: Duration,
}

impl RenderPool {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            permits: Semaphore::new(max_concurrent.max(1)),
            timeout,
        }
    }

    /// Free worker slots.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `action` over `source`.
    ///
    /// The slot is held only while the render is awaited. A render that times
    /// out gives its slot back at once and finishes on tokio's bounded
    /// blocking pool with its result discarded.
    pub async fn render(
        &self,
        action: Arc<dyn Action>,
        source: Vec<u8>,
        geometry: Geometry,
    ) -> Result<Vec<u8>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| Error::Internal(format!("Render pool closed: {}", e)))?;

        debug!(
            geometry = %geometry,
            bytes = source.len(),
            free_slots = self.available(),
            "Dispatching render"
        );

        let task = tokio::task::spawn_blocking(move || action.apply(&source, geometry));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(Error::TransformationFailure(format!(
                "Render task failed: {}",
                e
            ))),
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Render timed out");
                Err(Error::RenderTimeout {
                    millis: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn geometry() -> Geometry {
        Geometry::new(Some(10), Some(10)).unwrap()
    }

    #[tokio::test]
    async fn test_render_returns_action_output() {
        let pool = RenderPool::new(2, Duration::from_secs(5));
        let action: Arc<dyn Action> =
            Arc::new(|src: &[u8], _g: Geometry| -> Result<Vec<u8>> { Ok(src.repeat(2)) });

        let out = pool.render(action, b"ab".to_vec(), geometry()).await.unwrap();
        assert_eq!(out, b"abab");
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_render_timeout_is_an_error() {
        let pool = RenderPool::new(1, Duration::from_millis(50));
        let action: Arc<dyn Action> = Arc::new(|_: &[u8], _g: Geometry| -> Result<Vec<u8>> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(vec![])
        });

        let err = pool.render(action, vec![], geometry()).await.unwrap_err();
        assert!(matches!(err, Error::RenderTimeout { millis: 50 }));
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_hung_renders_do_not_stall_pool() {
        let pool = RenderPool::new(1, Duration::from_millis(30));
        let hung: Arc<dyn Action> = Arc::new(|_: &[u8], _g: Geometry| -> Result<Vec<u8>> {
            std::thread::sleep(Duration::from_millis(1000));
            Ok(vec![])
        });
        let quick: Arc<dyn Action> =
            Arc::new(|_: &[u8], _g: Geometry| -> Result<Vec<u8>> { Ok(vec![7]) });

        for _ in 0..3 {
            let err = pool.render(hung.clone(), vec![], geometry()).await.unwrap_err();
            assert!(matches!(err, Error::RenderTimeout { .. }));
        }

        let started = std::time::Instant::now();
        let out = pool.render(quick, vec![], geometry()).await.unwrap();
        assert_eq!(out, vec![7]);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_pool_bounds_concurrency() {
        let pool = Arc::new(RenderPool::new(2, Duration::from_secs(5)));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let action: Arc<dyn Action> = {
            let running = running.clone();
            let peak = peak.clone();
            Arc::new(move |_: &[u8], _g: Geometry| -> Result<Vec<u8>> {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(30));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(vec![])
            })
        };

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            let action = action.clone();
            handles.push(tokio::spawn(async move {
                pool.render(action, vec![], geometry()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_action_errors_propagate() {
        let pool = RenderPool::new(1, Duration::from_secs(1));
        let action: Arc<dyn Action> = Arc::new(|_: &[u8], _g: Geometry| -> Result<Vec<u8>> {
            Err(Error::TransformationFailure("boom".into()))
        });

        let err = pool.render(action, vec![], geometry()).await.unwrap_err();
        assert!(matches!(err, Error::TransformationFailure(_)));
    }
}
