//! No-operation cache implementation
//!
//! This module provides a cache implementation that doesn't store anything,
//! useful for testing or when caching is disabled.

use crate::Result;
use crate::cache::CacheStoreStats;
use crate::cache::traits::ChartCache;
use async_trait::async_trait;
use std::time::Duration;

/// A cache implementation that doesn't cache anything
///
/// This is useful for:
/// - Testing without cache interference
/// - Running with caching disabled
pub struct NoOpCache;

impl NoOpCache {
    /// Create a new no-op cache
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChartCache for NoOpCache {
    async fn set(&self, _key: &str, _payload: &str, _ttl: Duration) -> Result<()> {
        // Silently discard the value
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        // Always a cache miss
        Ok(None)
    }

    async fn is_valid(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn invalidate(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn cleanup(&self) -> Result<u64> {
        Ok(0)
    }

    async fn stats(&self) -> Result<CacheStoreStats> {
        Ok(CacheStoreStats::default())
    }
}

impl Default for NoOpCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_never_stores() {
        let cache = NoOpCache::new();

        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.is_valid("k").await.unwrap());
        assert_eq!(cache.cleanup().await.unwrap(), 0);
        assert_eq!(cache.stats().await.unwrap(), CacheStoreStats::default());
    }
}
