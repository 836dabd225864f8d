//! Cache factory for creating different cache implementations
//!
//! This module provides a factory pattern for creating cache instances
//! based on configuration.

use crate::cache::noop_cache::NoOpCache;
use crate::cache::sql_cache::SqliteChartCache;
use crate::cache::traits::ChartCache;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Configuration for different cache types
#[derive(Clone)]
pub enum CacheConfig {
    /// Durable SQLite-backed cache sharing the record store pool
    Durable { pool: SqlitePool },
    /// No-operation cache (caching disabled)
    NoOp,
}

/// Factory for creating cache implementations
pub struct CacheFactory;

impl CacheFactory {
    /// Create a cache implementation based on configuration
    pub fn create(config: CacheConfig) -> Arc<dyn ChartCache> {
        match config {
            CacheConfig::Durable { pool } => Arc::new(SqliteChartCache::new(pool)),
            CacheConfig::NoOp => Arc::new(NoOpCache::new()),
        }
    }

    /// Create a durable cache over a record store pool
    pub fn durable(pool: SqlitePool) -> Arc<dyn ChartCache> {
        Self::create(CacheConfig::Durable { pool })
    }

    /// Create a no-op cache
    pub fn noop() -> Arc<dyn ChartCache> {
        Self::create(CacheConfig::NoOp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_durable_factory_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();

        let cache = CacheFactory::durable(db.pool().clone());
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_noop_factory() {
        let cache = CacheFactory::noop();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
