//! Cache fallback coordinator
//!
//! Wraps the primary durable cache with an in-process secondary. Storage
//! failures never reach callers: a failing `set` or `get` retries against
//! the secondary, a failing `clear` is swallowed, and diagnostics degrade to
//! zeroes. A clean primary miss is a miss; the secondary only answers when
//! the primary errors.

use crate::cache::memory_cache::MemoryCache;
use crate::cache::traits::ChartCache;
use crate::cache::{CACHE_NAMESPACE, CacheStoreStats};
use std::sync::Arc;
use std::time::Duration;

/// Coordinates the primary cache store and the generic fallback cache
pub struct CacheCoordinator {
    primary: Arc<dyn ChartCache>,
    fallback: Arc<MemoryCache>,
}

impl CacheCoordinator {
    /// Create a coordinator over a primary cache and a fallback store
    pub fn new(primary: Arc<dyn ChartCache>, fallback: Arc<MemoryCache>) -> Self {
        Self { primary, fallback }
    }

    /// Store a payload; never fails
    pub async fn set(&self, key: &str, payload: &str, ttl: Duration) {
        if let Err(e) = self.primary.set(key, payload, ttl).await {
            log::warn!("Primary cache set failed for {key}, using fallback: {e}");
            self.fallback
                .set_item(payload, CACHE_NAMESPACE, key, ttl)
                .await;
        }
    }

    /// Get a payload; storage failures read as "no data"
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.primary.get(key).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Primary cache get failed for {key}, using fallback: {e}");
                self.fallback.get(CACHE_NAMESPACE, key).await
            }
        }
    }

    /// Check entry validity; storage failures fall back to the secondary
    pub async fn is_valid(&self, key: &str) -> bool {
        match self.primary.is_valid(key).await {
            Ok(valid) => valid,
            Err(e) => {
                log::warn!("Primary cache validity check failed for {key}, using fallback: {e}");
                self.fallback.get(CACHE_NAMESPACE, key).await.is_some()
            }
        }
    }

    /// Remove one entry, or all entries when no key is given
    ///
    /// Failures are swallowed; both layers are always attempted.
    pub async fn clear(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                if let Err(e) = self.primary.invalidate(key).await {
                    log::warn!("Primary cache invalidate failed for {key}: {e}");
                }
                self.fallback.delete_item(CACHE_NAMESPACE, key).await;
            }
            None => {
                if let Err(e) = self.primary.clear().await {
                    log::warn!("Primary cache clear failed: {e}");
                }
                self.fallback.delete_group(CACHE_NAMESPACE).await;
            }
        }
    }

    /// Sweep expired entries from both layers, reporting the primary's count
    pub async fn cleanup(&self) -> u64 {
        self.fallback.prune_expired().await;

        match self.primary.cleanup().await {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Primary cache cleanup failed: {e}");
                0
            }
        }
    }

    /// Primary store statistics; zeroed when the store is unreachable
    pub async fn stats(&self) -> CacheStoreStats {
        match self.primary.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                log::warn!("Primary cache stats failed: {e}");
                CacheStoreStats::default()
            }
        }
    }
}
