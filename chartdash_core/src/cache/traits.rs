//! Cache trait definitions
//!
//! This module defines the core ChartCache trait that all cache
//! implementations must implement.

use crate::Result;
use crate::cache::CacheStoreStats;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for chart dataset cache implementations
///
/// Payloads are serialized datasets and opaque to the cache.
#[async_trait]
pub trait ChartCache: Send + Sync {
    /// Store a payload under a key with the given time-to-live
    ///
    /// Upserts: an existing entry gets its payload, expiry, and updated
    /// timestamp overwritten.
    async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<()>;

    /// Get a payload from the cache
    ///
    /// Returns `Ok(Some(payload))` only when an entry exists and is
    /// unexpired; an expired entry reads as `Ok(None)` even while its row
    /// still exists. Stale data is never returned.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Check entry validity without reading the payload
    ///
    /// Agrees with `get` at every point in time: `is_valid(key)` is true
    /// exactly when `get(key)` would return a value.
    async fn is_valid(&self, key: &str) -> Result<bool>;

    /// Remove a specific cache entry if it exists
    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Remove all cache entries
    async fn clear(&self) -> Result<()>;

    /// Delete entries whose expiry has passed, returning the count removed
    async fn cleanup(&self) -> Result<u64>;

    /// Get cache statistics
    async fn stats(&self) -> Result<CacheStoreStats>;
}
