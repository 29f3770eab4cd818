//! TTL cache for the medicine listing.
//!
//! Entries are keyed by a generation number. Invalidation bumps the
//! generation, so a listing loaded before a write can never be served after
//! it, even if the load finishes late.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::models::Medicine;

/// Cached medicine listing. Cheap to share behind an `Arc`.
pub struct MedicineCache {
    cache: Option<Cache<u64, Arc<Vec<Medicine>>>>,
    generation: AtomicU64,
}

impl MedicineCache {
    /// Create a cache with the given TTL. A zero TTL disables caching.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(4)
                .time_to_live(ttl)
                .build()
        });
        Self {
            cache,
            generation: AtomicU64::new(0),
        }
    }

    /// A cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Return the cached listing, or run `load` and cache its result.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` returns. Errors are never cached.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<Vec<Medicine>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Medicine>, E>>,
    {
        let Some(cache) = &self.cache else {
            return load().await.map(Arc::new);
        };

        let generation = self.generation.load(Ordering::Acquire);
        if let Some(medicines) = cache.get(&generation).await {
            debug!("Cache hit for medicine list");
            return Ok(medicines);
        }

        let medicines = Arc::new(load().await?);
        cache.insert(generation, Arc::clone(&medicines)).await;
        Ok(medicines)
    }

    /// Drop the cached listing. Called after every medicine write.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    async fn load_counting(calls: &AtomicUsize) -> Result<Vec<Medicine>, ()> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    #[tokio::test]
    async fn test_hit_after_first_load() {
        let cache = MedicineCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        cache.get_or_load(|| load_counting(&calls)).await.unwrap();
        cache.get_or_load(|| load_counting(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = MedicineCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        cache.get_or_load(|| load_counting(&calls)).await.unwrap();
        cache.invalidate().await;
        cache.get_or_load(|| load_counting(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_always_loads() {
        let cache = MedicineCache::disabled();
        let calls = AtomicUsize::new(0);

        assert!(!cache.is_enabled());
        cache.get_or_load(|| load_counting(&calls)).await.unwrap();
        cache.get_or_load(|| load_counting(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
