//! SQLite-backed implementation of the ChartCache trait
//!
//! Durable cache of serialized chart datasets with per-entry expiration.
//! Expiry comparisons run against text timestamps, so an expired row reads
//! as absent immediately even though it occupies storage until `cleanup`.

use crate::Result;
use crate::cache::CacheStoreStats;
use crate::cache::traits::ChartCache;
use crate::database::models::time_text;
use async_trait::async_trait;
use chrono::TimeDelta;
use sqlx::{Row, SqlitePool};
use std::time::Duration;

/// SQLite-backed chart dataset cache
pub struct SqliteChartCache {
    pool: SqlitePool,
}

impl SqliteChartCache {
    /// Create a cache over an existing record-store pool
    ///
    /// The `chart_cache` table is created by the database migrations.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn expiry_for(ttl: Duration) -> String {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::zero());
        time_text::to_text(time_text::now() + ttl)
    }
}

#[async_trait]
impl ChartCache for SqliteChartCache {
    async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<()> {
        let now = time_text::to_text(time_text::now());
        let expires_at = Self::expiry_for(ttl);

        sqlx::query(
            r#"
            INSERT INTO chart_cache (cache_key, cache_data, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(cache_key) DO UPDATE SET
                cache_data = excluded.cache_data,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(&expires_at)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = time_text::to_text(time_text::now());

        let row = sqlx::query(
            r#"
            SELECT cache_data
            FROM chart_cache
            WHERE cache_key = ? AND expires_at > ?
            "#,
        )
        .bind(key)
        .bind(&now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| row.try_get::<String, _>("cache_data").map_err(Into::into))
            .transpose()
    }

    async fn is_valid(&self, key: &str) -> Result<bool> {
        let now = time_text::to_text(time_text::now());

        let row = sqlx::query(
            "SELECT id FROM chart_cache WHERE cache_key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(&now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM chart_cache WHERE cache_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM chart_cache")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup(&self) -> Result<u64> {
        let now = time_text::to_text(time_text::now());

        let result = sqlx::query("DELETE FROM chart_cache WHERE expires_at < ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn stats(&self) -> Result<CacheStoreStats> {
        let now = time_text::to_text(time_text::now());

        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_entries,
                COALESCE(SUM(CASE WHEN expires_at > ? THEN 1 ELSE 0 END), 0) AS valid_entries,
                COALESCE(SUM(CASE WHEN expires_at <= ? THEN 1 ELSE 0 END), 0) AS expired_entries,
                COALESCE(AVG(LENGTH(cache_data)), 0.0) AS avg_size
            FROM chart_cache
            "#,
        )
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Ok(CacheStoreStats {
            total_entries: row.try_get::<i64, _>("total_entries")? as u64,
            valid_entries: row.try_get::<i64, _>("valid_entries")? as u64,
            expired_entries: row.try_get::<i64, _>("expired_entries")? as u64,
            avg_size_bytes: row.try_get::<f64, _>("avg_size")? as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use tempfile::TempDir;

    async fn create_test_cache() -> (SqliteChartCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
        (SqliteChartCache::new(db.pool().clone()), temp_dir)
    }

    const TTL: Duration = Duration::from_secs(900);

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let (cache, _tmp) = create_test_cache().await;

        cache.set("k1", r#"{"a":1}"#, TTL).await.unwrap();
        let value = cache.get("k1").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (cache, _tmp) = create_test_cache().await;
        assert_eq!(cache.get("nothing").await.unwrap(), None);
        assert!(!cache.is_valid("nothing").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_overwrites_on_collision() {
        let (cache, _tmp) = create_test_cache().await;

        cache.set("k1", "old", TTL).await.unwrap();
        cache.set("k1", "new", TTL).await.unwrap();

        assert_eq!(cache.get("k1").await.unwrap().as_deref(), Some("new"));

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let (cache, _tmp) = create_test_cache().await;

        // Zero TTL expires within the current second
        cache.set("gone", "data", Duration::ZERO).await.unwrap();

        assert_eq!(cache.get("gone").await.unwrap(), None);
        assert!(!cache.is_valid("gone").await.unwrap());

        // The row still physically exists until cleanup
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.valid_entries, 0);
        assert_eq!(stats.expired_entries, 1);
    }

    #[tokio::test]
    async fn test_is_valid_agrees_with_get() {
        let (cache, _tmp) = create_test_cache().await;

        cache.set("live", "x", TTL).await.unwrap();
        cache.set("dead", "y", Duration::ZERO).await.unwrap();

        for key in ["live", "dead", "absent"] {
            let valid = cache.is_valid(key).await.unwrap();
            let present = cache.get(key).await.unwrap().is_some();
            assert_eq!(valid, present, "disagreement for key {key}");
        }
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired() {
        let (cache, _tmp) = create_test_cache().await;

        cache.set("live", "x", TTL).await.unwrap();
        cache.set("dead", "y", Duration::ZERO).await.unwrap();

        // Let the zero-TTL expiry fall strictly into the past
        tokio::time::sleep(Duration::from_millis(1100)).await;

        let removed = cache.cleanup().await.unwrap();
        assert_eq!(removed, 1);

        // Immediately repeating the sweep removes nothing
        assert_eq!(cache.cleanup().await.unwrap(), 0);

        assert!(cache.is_valid("live").await.unwrap());
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let (cache, _tmp) = create_test_cache().await;

        cache.set("a", "1", TTL).await.unwrap();
        cache.set("b", "2", TTL).await.unwrap();

        cache.invalidate("a").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.get("b").await.unwrap().is_some());

        cache.clear().await.unwrap();
        assert_eq!(cache.stats().await.unwrap().total_entries, 0);
    }

    #[tokio::test]
    async fn test_stats_average_size() {
        let (cache, _tmp) = create_test_cache().await;

        cache.set("a", "1234", TTL).await.unwrap();
        cache.set("b", "12345678", TTL).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 2);
        assert_eq!(stats.avg_size_bytes, 6);
    }
}
