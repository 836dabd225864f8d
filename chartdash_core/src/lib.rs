//! Dashboard analytics core
//!
//! Aggregates donor contribution records into precomputed chart datasets and
//! caches them with expiration, fallback, and warm-up semantics. Chart
//! rendering, export formatting, permissions, and mail transport live in
//! external collaborators; this crate owns the datasets and their cache.

pub mod aggregate;
pub mod alerts;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod error;
pub mod reports;
pub mod timewindow;

// Re-export main types
pub use aggregate::{ActivityTotals, AggregationEngine};
pub use alerts::{AlertService, AlertTransport, AlertType};
pub use cache::{
    CacheCoordinator, CacheStoreStats, ChartCache, MemoryCache, NoOpCache, SqliteChartCache,
    generate_cache_key,
};
pub use config::{DashboardSettings, SettingsProvider};
pub use dashboard::{
    ChartDataService, CleanupReport, DashboardStats, WarmupDetail, WarmupReport, WarmupStatus,
};
pub use database::{Database, DatabaseStats};
pub use error::{Error, Result};
pub use reports::{ChartRendering, ReportDataset, ReportInfo, ReportType};
pub use timewindow::{Granularity, TimeRange, TimeWindow};
