//! Dashboard query facade
//!
//! `ChartDataService` is the public entry point: it resolves cache keys,
//! consults the fallback-coordinated cache, invokes the aggregation engine on
//! a miss, and exposes warm-up and cache administration. Cache-layer problems
//! never surface to callers; aggregation failures always do.

use crate::aggregate::AggregationEngine;
use crate::cache::factory::CacheFactory;
use crate::cache::{
    CacheCoordinator, CacheStoreStats, ChartCache, MemoryCache, generate_cache_key,
};
use crate::config::SettingsProvider;
use crate::database::Database;
use crate::database::models::time_text;
use crate::error::Result;
use crate::reports::{ReportDataset, ReportInfo, ReportType};
use crate::timewindow::{TimeRange, TimeWindow};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;

/// Public query surface for chart datasets
pub struct ChartDataService {
    engine: AggregationEngine,
    cache: CacheCoordinator,
    settings: Arc<SettingsProvider>,
}

impl ChartDataService {
    /// Create a service over a record store with the durable cache
    pub fn new(db: &Database, settings: Arc<SettingsProvider>) -> Self {
        let primary = CacheFactory::durable(db.pool().clone());
        Self::with_cache(db, settings, primary)
    }

    /// Create a service with a specific primary cache implementation
    pub fn with_cache(
        db: &Database,
        settings: Arc<SettingsProvider>,
        primary: Arc<dyn ChartCache>,
    ) -> Self {
        Self {
            engine: AggregationEngine::new(db.pool().clone()),
            cache: CacheCoordinator::new(primary, Arc::new(MemoryCache::new())),
            settings,
        }
    }

    /// The static report catalog, in presentation order
    pub fn available_reports() -> Vec<(ReportType, ReportInfo)> {
        ReportType::ALL
            .iter()
            .map(|report| (*report, report.info()))
            .collect()
    }

    /// Get a report dataset, from cache when possible
    ///
    /// On a hit the cached payload is returned as-is. On a miss the dataset
    /// is computed, stored with the configured TTL, and returned. Aggregation
    /// failures propagate; they are never cached as empty datasets.
    pub async fn get_data(&self, report: ReportType, range: TimeRange) -> Result<ReportDataset> {
        let settings = self.settings.current();
        let key = generate_cache_key(report.as_key(), range.as_token(), None);

        if settings.enable_caching
            && let Some(payload) = self.cache.get(&key).await
        {
            match serde_json::from_str::<ReportDataset>(&payload) {
                Ok(dataset) => return Ok(dataset),
                Err(e) => {
                    // Treat a corrupt entry as a miss and recompute
                    log::warn!("Discarding unreadable cache entry {key}: {e}");
                }
            }
        }

        let dataset = self.compute(report, range, time_text::now()).await?;

        if settings.enable_caching {
            self.store(&key, &dataset).await;
        }

        Ok(dataset)
    }

    /// Compute a dataset directly, bypassing the cache read
    async fn compute(
        &self,
        report: ReportType,
        range: TimeRange,
        now: NaiveDateTime,
    ) -> Result<ReportDataset> {
        let window = TimeWindow::resolve(range, now);

        match report {
            ReportType::RealtimeDonations => Ok(ReportDataset::RealtimeDonations(
                self.engine.realtime_donations(&window).await?,
            )),
            ReportType::RecurringVsOnetime => Ok(ReportDataset::RecurringVsOnetime(
                self.engine.recurring_vs_onetime(&window).await?,
            )),
            ReportType::LapsedDonors => Ok(ReportDataset::LapsedDonors(
                self.engine.lapsed_donors(now).await?,
            )),
            ReportType::DonorRetention => Ok(ReportDataset::DonorRetention(
                self.engine.donor_retention(now).await?,
            )),
            ReportType::AvgGiftTrend => Ok(ReportDataset::AvgGiftTrend(
                self.engine.avg_gift_trend(&window).await?,
            )),
            ReportType::CampaignProgress => Ok(ReportDataset::CampaignProgress(
                self.engine.campaign_progress(now).await?,
            )),
            ReportType::PledgedVsActual => Ok(ReportDataset::PledgedVsActual(
                self.engine.pledged_vs_actual(&window).await?,
            )),
            ReportType::MembershipRevenue => Ok(ReportDataset::MembershipRevenue(
                self.engine.membership_revenue(&window).await?,
            )),
        }
    }

    /// Serialize and store a dataset; problems are logged, never raised
    async fn store(&self, key: &str, dataset: &ReportDataset) {
        match serde_json::to_string(dataset) {
            Ok(payload) => {
                let ttl = self.settings.current().cache_ttl();
                self.cache.set(key, &payload, ttl).await;
            }
            Err(e) => {
                log::error!("Failed to serialize dataset for {key}: {e}");
            }
        }
    }

    /// Populate the cache ahead of demand
    ///
    /// Defaults to every report type crossed with the common warm-up ranges.
    /// A pair with a valid entry is skipped unless `force_refresh`; one
    /// pair's failure never aborts the rest.
    pub async fn warmup(
        &self,
        reports: Option<&[ReportType]>,
        ranges: Option<&[TimeRange]>,
        force_refresh: bool,
    ) -> WarmupReport {
        let reports = reports.unwrap_or(&ReportType::ALL);
        let ranges = ranges.unwrap_or(&TimeRange::WARMUP_DEFAULTS);

        let mut report = WarmupReport::default();

        for &report_type in reports {
            for &range in ranges {
                let key = generate_cache_key(report_type.as_key(), range.as_token(), None);

                if !force_refresh && self.cache.is_valid(&key).await {
                    report.skipped += 1;
                    report.details.push(WarmupDetail {
                        report_type,
                        time_range: range,
                        status: WarmupStatus::Skipped,
                        data_points: None,
                        message: Some("Valid cache exists".to_string()),
                    });
                    continue;
                }

                match self.compute(report_type, range, time_text::now()).await {
                    Ok(dataset) => {
                        self.store(&key, &dataset).await;
                        report.warmed_up += 1;
                        report.details.push(WarmupDetail {
                            report_type,
                            time_range: range,
                            status: WarmupStatus::Success,
                            data_points: Some(dataset.len()),
                            message: None,
                        });
                    }
                    Err(e) => {
                        report.errors += 1;
                        report.details.push(WarmupDetail {
                            report_type,
                            time_range: range,
                            status: WarmupStatus::Error,
                            data_points: None,
                            message: Some(e.to_string()),
                        });
                    }
                }
            }
        }

        log::info!(
            "Cache warmup completed: {} warmed up, {} skipped, {} errors",
            report.warmed_up,
            report.skipped,
            report.errors
        );

        report
    }

    /// Remove one cache entry, or all entries when no key is given
    pub async fn clear_cache(&self, key: Option<&str>) {
        self.cache.clear(key).await;
    }

    /// Cache store statistics
    pub async fn cache_stats(&self) -> CacheStoreStats {
        self.cache.stats().await
    }

    /// Sweep expired cache entries, returning the count removed
    pub async fn cache_cleanup(&self) -> u64 {
        self.cache.cleanup().await
    }

    /// Headline totals for the dashboard landing view
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let now = time_text::now();
        let totals = self.engine.activity_totals(now).await?;
        let cache = self.cache.stats().await;

        Ok(DashboardStats {
            total_contributions: totals.total_contributions,
            total_amount: totals.total_amount,
            unique_donors: totals.unique_donors,
            active_campaigns: totals.active_campaigns,
            cache_entries: cache.valid_entries,
            last_updated: time_text::to_text(now),
        })
    }

    /// Maintenance sweep: expired cache entries plus alert log retention
    ///
    /// Per-step failures are collected into the report, not raised.
    pub async fn cleanup(&self, alerts: &crate::alerts::AlertService) -> CleanupReport {
        let mut report = CleanupReport::default();

        report.cache_cleaned = self.cache.cleanup().await;

        match alerts.enforce_retention().await {
            Ok(count) => report.alerts_cleaned = count,
            Err(e) => report.errors.push(e.to_string()),
        }

        report
    }
}

/// Outcome of one warm-up pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupStatus {
    Success,
    Skipped,
    Error,
}

/// Itemized warm-up result for one (report, range) pair
#[derive(Debug, Clone, Serialize)]
pub struct WarmupDetail {
    pub report_type: ReportType,
    pub time_range: TimeRange,
    pub status: WarmupStatus,
    pub data_points: Option<usize>,
    pub message: Option<String>,
}

/// Full warm-up report: counters plus per-pair details
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarmupReport {
    pub warmed_up: u32,
    pub skipped: u32,
    pub errors: u32,
    pub details: Vec<WarmupDetail>,
}

/// Headline dashboard totals
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_contributions: i64,
    pub total_amount: f64,
    pub unique_donors: i64,
    pub active_campaigns: i64,
    pub cache_entries: u64,
    pub last_updated: String,
}

/// Result of the combined maintenance sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub cache_cleaned: u64,
    pub alerts_cleaned: u64,
    pub errors: Vec<String>,
}
