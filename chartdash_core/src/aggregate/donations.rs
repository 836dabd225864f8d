//! Contribution-series aggregations
//!
//! Real-time donation totals, the recurring/one-time split, and the average
//! gift trend. All three bucket completed contributions by the window's
//! granularity.

use sqlx::Row;
use std::collections::BTreeMap;

use super::{AggregationEngine, round2};
use crate::Result;
use crate::database::models::time_text;
use crate::reports::{
    DonationPoint, DonationSummary, GiftTrendPoint, RealTimeDonations, RecurringSplitPoint,
};
use crate::timewindow::TimeWindow;

impl AggregationEngine {
    /// Real-time donation series with window-wide summary totals
    pub async fn realtime_donations(&self, window: &TimeWindow) -> Result<RealTimeDonations> {
        let bucket = window.granularity.bucket_expr("receive_date");
        let sql = format!(
            r#"
            SELECT
                {bucket} AS period,
                SUM(total_amount) AS bucket_total,
                COUNT(*) AS donation_count,
                AVG(total_amount) AS avg_amount
            FROM contributions
            WHERE status = 'completed'
              AND receive_date >= ? AND receive_date <= ?
            GROUP BY period
            ORDER BY period ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(time_text::to_text(window.start))
            .bind(time_text::to_text(window.end))
            .fetch_all(self.pool())
            .await?;

        let mut chart_data = Vec::with_capacity(rows.len());
        let mut total_amount = 0.0;
        let mut total_count = 0i64;

        for row in rows {
            let amount: f64 = row.try_get("bucket_total")?;
            let count: i64 = row.try_get("donation_count")?;

            chart_data.push(DonationPoint {
                date: row.try_get("period")?,
                amount,
                count,
                avg_amount: row.try_get("avg_amount")?,
            });
            total_amount += amount;
            total_count += count;
        }

        let avg_donation = if total_count > 0 {
            total_amount / total_count as f64
        } else {
            0.0
        };

        Ok(RealTimeDonations {
            chart_data,
            summary: DonationSummary {
                total_amount,
                total_count,
                avg_donation,
                time_range: window.range.as_token().to_string(),
            },
        })
    }

    /// Recurring vs one-time split per bucket
    ///
    /// A contribution is recurring when it links to a recurring agreement.
    /// Output is dense: a bucket missing one class carries zeros for it.
    pub async fn recurring_vs_onetime(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<RecurringSplitPoint>> {
        let bucket = window.granularity.bucket_expr("c.receive_date");
        let sql = format!(
            r#"
            SELECT
                {bucket} AS period,
                CASE WHEN rc.id IS NOT NULL THEN 'recurring' ELSE 'one_time' END AS class,
                SUM(c.total_amount) AS amount,
                COUNT(*) AS cnt
            FROM contributions c
            LEFT JOIN recurring_contributions rc ON c.recurring_id = rc.id
            WHERE c.status = 'completed'
              AND c.receive_date >= ? AND c.receive_date <= ?
            GROUP BY period, class
            ORDER BY period ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(time_text::to_text(window.start))
            .bind(time_text::to_text(window.end))
            .fetch_all(self.pool())
            .await?;

        let mut buckets: BTreeMap<String, RecurringSplitPoint> = BTreeMap::new();

        for row in rows {
            let period: String = row.try_get("period")?;
            let class: String = row.try_get("class")?;
            let amount: f64 = row.try_get("amount")?;
            let count: i64 = row.try_get("cnt")?;

            let point = buckets
                .entry(period.clone())
                .or_insert_with(|| RecurringSplitPoint {
                    date: period,
                    recurring_amount: 0.0,
                    one_time_amount: 0.0,
                    recurring_count: 0,
                    one_time_count: 0,
                });

            if class == "recurring" {
                point.recurring_amount = amount;
                point.recurring_count = count;
            } else {
                point.one_time_amount = amount;
                point.one_time_count = count;
            }
        }

        Ok(buckets.into_values().collect())
    }

    /// Average gift size per bucket, with count and min/max spread
    pub async fn avg_gift_trend(&self, window: &TimeWindow) -> Result<Vec<GiftTrendPoint>> {
        let bucket = window.granularity.bucket_expr("receive_date");
        let sql = format!(
            r#"
            SELECT
                {bucket} AS period,
                AVG(total_amount) AS avg_gift_size,
                COUNT(*) AS donation_count,
                MIN(total_amount) AS min_gift,
                MAX(total_amount) AS max_gift
            FROM contributions
            WHERE status = 'completed'
              AND receive_date >= ? AND receive_date <= ?
            GROUP BY period
            ORDER BY period ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(time_text::to_text(window.start))
            .bind(time_text::to_text(window.end))
            .fetch_all(self.pool())
            .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            data.push(GiftTrendPoint {
                period: row.try_get("period")?,
                avg_gift_size: round2(row.try_get("avg_gift_size")?),
                donation_count: row.try_get("donation_count")?,
                min_gift: row.try_get("min_gift")?,
                max_gift: row.try_get("max_gift")?,
            });
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ContributionStatus;
    use crate::database::repositories::{ContributionRepository, NewContribution};
    use crate::database::Database;
    use crate::timewindow::TimeRange;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    async fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
        (db, temp_dir)
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn on_day(d: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    async fn give(
        repo: &ContributionRepository,
        contact_id: i64,
        amount: f64,
        at: NaiveDateTime,
        status: ContributionStatus,
        recurring_id: Option<i64>,
    ) {
        repo.insert(&NewContribution {
            contact_id,
            campaign_id: None,
            recurring_id,
            total_amount: amount,
            receive_date: at,
            status,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_realtime_donations_daily_buckets() {
        let (db, _tmp) = create_test_db().await;
        let repo = ContributionRepository::new(db.pool().clone());
        let engine = AggregationEngine::new(db.pool().clone());

        give(&repo, 1, 100.0, on_day(12, 9), ContributionStatus::Completed, None).await;
        give(&repo, 2, 50.0, on_day(12, 17), ContributionStatus::Completed, None).await;
        give(&repo, 3, 25.0, on_day(14, 8), ContributionStatus::Completed, None).await;
        // Non-completed records never aggregate
        give(&repo, 4, 999.0, on_day(13, 8), ContributionStatus::Pending, None).await;

        let window = TimeWindow::resolve(TimeRange::Last7Days, now());
        let result = engine.realtime_donations(&window).await.unwrap();

        assert_eq!(result.chart_data.len(), 2);
        assert_eq!(result.chart_data[0].date, "2025-06-12");
        assert_eq!(result.chart_data[0].amount, 150.0);
        assert_eq!(result.chart_data[0].count, 2);
        assert_eq!(result.chart_data[0].avg_amount, 75.0);
        assert_eq!(result.chart_data[1].date, "2025-06-14");

        assert_eq!(result.summary.total_amount, 175.0);
        assert_eq!(result.summary.total_count, 3);
        assert!((result.summary.avg_donation - 175.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.summary.time_range, "7days");
    }

    #[tokio::test]
    async fn test_realtime_donations_empty_window() {
        let (db, _tmp) = create_test_db().await;
        let engine = AggregationEngine::new(db.pool().clone());

        let window = TimeWindow::resolve(TimeRange::Last7Days, now());
        let result = engine.realtime_donations(&window).await.unwrap();

        assert!(result.chart_data.is_empty());
        assert_eq!(result.summary.total_count, 0);
        assert_eq!(result.summary.avg_donation, 0.0);
    }

    #[tokio::test]
    async fn test_window_boundaries_are_inclusive() {
        let (db, _tmp) = create_test_db().await;
        let repo = ContributionRepository::new(db.pool().clone());
        let engine = AggregationEngine::new(db.pool().clone());

        let window = TimeWindow::resolve(TimeRange::Last7Days, now());
        // Exactly at start and exactly at end both count
        give(&repo, 1, 10.0, window.start, ContributionStatus::Completed, None).await;
        give(&repo, 2, 20.0, window.end, ContributionStatus::Completed, None).await;
        // One second past the end does not
        give(
            &repo,
            3,
            40.0,
            window.end + chrono::TimeDelta::seconds(1),
            ContributionStatus::Completed,
            None,
        )
        .await;

        let result = engine.realtime_donations(&window).await.unwrap();
        assert_eq!(result.summary.total_amount, 30.0);
        assert_eq!(result.summary.total_count, 2);
    }

    #[tokio::test]
    async fn test_recurring_split_is_dense() {
        let (db, _tmp) = create_test_db().await;
        let repo = ContributionRepository::new(db.pool().clone());
        let engine = AggregationEngine::new(db.pool().clone());

        let agreement = repo.insert_recurring_agreement(1, 25.0, "month").await.unwrap();

        give(&repo, 1, 25.0, on_day(12, 9), ContributionStatus::Completed, Some(agreement)).await;
        give(&repo, 2, 80.0, on_day(12, 10), ContributionStatus::Completed, None).await;
        // Day 13 has only a one-time gift; recurring side must be zero-filled
        give(&repo, 3, 15.0, on_day(13, 11), ContributionStatus::Completed, None).await;

        let window = TimeWindow::resolve(TimeRange::Last7Days, now());
        let result = engine.recurring_vs_onetime(&window).await.unwrap();

        assert_eq!(result.len(), 2);

        let day12 = &result[0];
        assert_eq!(day12.date, "2025-06-12");
        assert_eq!(day12.recurring_amount, 25.0);
        assert_eq!(day12.recurring_count, 1);
        assert_eq!(day12.one_time_amount, 80.0);
        assert_eq!(day12.one_time_count, 1);

        let day13 = &result[1];
        assert_eq!(day13.recurring_amount, 0.0);
        assert_eq!(day13.recurring_count, 0);
        assert_eq!(day13.one_time_amount, 15.0);
    }

    #[tokio::test]
    async fn test_avg_gift_trend_min_max() {
        let (db, _tmp) = create_test_db().await;
        let repo = ContributionRepository::new(db.pool().clone());
        let engine = AggregationEngine::new(db.pool().clone());

        give(&repo, 1, 10.0, on_day(12, 9), ContributionStatus::Completed, None).await;
        give(&repo, 2, 30.0, on_day(12, 15), ContributionStatus::Completed, None).await;

        let window = TimeWindow::resolve(TimeRange::Last7Days, now());
        let result = engine.avg_gift_trend(&window).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].avg_gift_size, 20.0);
        assert_eq!(result[0].donation_count, 2);
        assert_eq!(result[0].min_gift, 10.0);
        assert_eq!(result[0].max_gift, 30.0);
    }

    #[tokio::test]
    async fn test_hourly_buckets_for_short_ranges() {
        let (db, _tmp) = create_test_db().await;
        let repo = ContributionRepository::new(db.pool().clone());
        let engine = AggregationEngine::new(db.pool().clone());

        give(&repo, 1, 5.0, on_day(15, 8), ContributionStatus::Completed, None).await;
        give(&repo, 2, 7.0, on_day(15, 9), ContributionStatus::Completed, None).await;

        let window = TimeWindow::resolve(TimeRange::Last24Hours, now());
        let result = engine.realtime_donations(&window).await.unwrap();

        assert_eq!(result.chart_data.len(), 2);
        assert_eq!(result.chart_data[0].date, "2025-06-15 08:00:00");
        assert_eq!(result.chart_data[1].date, "2025-06-15 09:00:00");
    }
}
