//! Database migration system
//!
//! This module handles database schema migrations, ensuring the database
//! is always at the correct version.

use crate::{Error, Result, error::StorageError};
use sqlx::SqlitePool;
use std::time::{SystemTime, UNIX_EPOCH};

use super::schema::SCHEMA_V1;

/// Run all necessary migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_current_version(pool).await?;

    if current_version < 1 {
        apply_migration(pool, 1, SCHEMA_V1).await?;
    }

    Ok(())
}

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await?;

    if table_exists == 0 {
        return Ok(0);
    }

    let version = sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;

    Ok(version.unwrap_or(0))
}

/// Apply a single migration
async fn apply_migration(pool: &SqlitePool, version: i32, sql: &str) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| Error::Storage(StorageError::migration(version, e.to_string())))?;

    sqlx::raw_sql(sql)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Storage(StorageError::migration(version, e.to_string())))?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;

    sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (?, ?)")
        .bind(version)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Storage(StorageError::migration(version, e.to_string())))?;

    tx.commit()
        .await
        .map_err(|e| Error::Storage(StorageError::migration(version, e.to_string())))?;

    Ok(())
}

/// Check if a table exists
#[cfg(test)]
async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::super::schema::CURRENT_SCHEMA_VERSION;
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let connect_options = sqlx::sqlite::SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            db_path.display()
        ))
        .unwrap()
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true);

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .unwrap();

        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_migrations_fresh_database() {
        let (pool, _temp_dir) = create_test_pool().await;

        let version = get_current_version(&pool).await.unwrap();
        assert_eq!(version, 0);

        run_migrations(&pool).await.unwrap();

        let version = get_current_version(&pool).await.unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);

        assert!(table_exists(&pool, "contributions").await.unwrap());
        assert!(table_exists(&pool, "campaigns").await.unwrap());
        assert!(table_exists(&pool, "pledges").await.unwrap());
        assert!(table_exists(&pool, "pledge_payments").await.unwrap());
        assert!(table_exists(&pool, "memberships").await.unwrap());
        assert!(table_exists(&pool, "membership_types").await.unwrap());
        assert!(table_exists(&pool, "membership_payments").await.unwrap());
        assert!(table_exists(&pool, "chart_cache").await.unwrap());
        assert!(table_exists(&pool, "alert_log").await.unwrap());
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let (pool, _temp_dir) = create_test_pool().await;

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let version = get_current_version(&pool).await.unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
    }
}
