//! Database module for SQLite-based record storage
//!
//! This module provides storage for the raw donor records the aggregation
//! engine reads (contributions, campaigns, pledges, memberships), the chart
//! dataset cache table, and the alert log.

pub mod migrations;
pub mod models;
pub mod repositories;
pub mod schema;

use crate::{Error, Result, error::StorageError};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

// Re-export commonly used types
pub use models::{
    AlertLogEntry, Campaign, Contribution, ContributionStatus, Membership, Pledge,
    RecurringContribution,
};
pub use repositories::{
    CampaignRepository, ContributionRepository, MembershipRepository, PledgeRepository,
};

/// Database connection manager with connection pooling
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection with migrations
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(StorageError::connection(e.to_string())))?;
        }

        // Build connection options with WAL mode for better concurrency
        let connect_options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
                .map_err(|e| Error::Storage(StorageError::connection(e.to_string())))?
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .foreign_keys(true);

        // Create connection pool
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(10)
            .connect_with(connect_options)
            .await
            .map_err(|e| Error::Storage(StorageError::connection(e.to_string())))?;

        let db = Self { pool };

        // Run migrations
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get database statistics
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let contribution_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contributions")
                .fetch_one(&self.pool)
                .await?;

        let campaign_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM campaigns")
            .fetch_one(&self.pool)
            .await?;

        let pledge_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pledges")
            .fetch_one(&self.pool)
            .await?;

        let membership_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM memberships")
            .fetch_one(&self.pool)
            .await?;

        let cache_entry_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chart_cache")
            .fetch_one(&self.pool)
            .await?;

        let alert_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alert_log")
            .fetch_one(&self.pool)
            .await?;

        Ok(DatabaseStats {
            contribution_count: contribution_count as u64,
            campaign_count: campaign_count as u64,
            pledge_count: pledge_count as u64,
            membership_count: membership_count as u64,
            cache_entry_count: cache_entry_count as u64,
            alert_count: alert_count as u64,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, Default)]
pub struct DatabaseStats {
    pub contribution_count: u64,
    pub campaign_count: u64,
    pub pledge_count: u64,
    pub membership_count: u64,
    pub cache_entry_count: u64,
    pub alert_count: u64,
}
