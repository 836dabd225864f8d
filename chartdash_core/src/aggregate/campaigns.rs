//! Campaign and pledge aggregations

use chrono::NaiveDateTime;
use sqlx::Row;
use std::collections::BTreeMap;

use super::{AggregationEngine, ratio_pct, start_of_day};
use crate::Result;
use crate::database::models::time_text;
use crate::reports::{CampaignProgressRow, PledgeComparisonPoint};
use crate::timewindow::TimeWindow;

/// Active campaigns reported, most recently started first
const CAMPAIGN_LIMIT: i64 = 10;

impl AggregationEngine {
    /// Fundraising progress for active campaigns
    ///
    /// A campaign is active when flagged so and its end date is null or in
    /// the future. Progress is raised/goal as a percentage, 0 for a zero
    /// goal. Limited to the ten most recently started campaigns.
    pub async fn campaign_progress(&self, now: NaiveDateTime) -> Result<Vec<CampaignProgressRow>> {
        let rows = sqlx::query(
            r#"
            SELECT
                camp.id AS campaign_id,
                camp.title AS campaign_name,
                camp.goal_amount,
                camp.start_date,
                camp.end_date,
                COALESCE(SUM(c.total_amount), 0.0) AS raised_amount,
                COUNT(c.id) AS donation_count
            FROM campaigns camp
            LEFT JOIN contributions c ON c.campaign_id = camp.id
                AND c.status = 'completed'
            WHERE camp.is_active = 1
              AND (camp.end_date IS NULL OR camp.end_date >= ?)
            GROUP BY camp.id, camp.title, camp.goal_amount, camp.start_date, camp.end_date
            ORDER BY camp.start_date DESC
            LIMIT ?
            "#,
        )
        .bind(time_text::to_text(start_of_day(now)))
        .bind(CAMPAIGN_LIMIT)
        .fetch_all(self.pool())
        .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let goal_amount: f64 = row.try_get("goal_amount")?;
            let raised_amount: f64 = row.try_get("raised_amount")?;

            data.push(CampaignProgressRow {
                campaign_id: row.try_get("campaign_id")?,
                campaign_name: row.try_get("campaign_name")?,
                goal_amount,
                raised_amount,
                donation_count: row.try_get("donation_count")?,
                progress_percentage: ratio_pct(raised_amount, goal_amount),
                start_date: row.try_get("start_date")?,
                end_date: row.try_get("end_date")?,
            });
        }

        Ok(data)
    }

    /// Pledged vs fulfilled amounts, bucketed by pledge creation date
    ///
    /// Pledged sums each pledge's amount once; actual sums the completed
    /// contributions linked through pledge payments. Fulfillment is
    /// actual/pledged as a percentage, 0 for a zero pledge base.
    pub async fn pledged_vs_actual(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<PledgeComparisonPoint>> {
        let start = time_text::to_text(window.start);
        let end = time_text::to_text(window.end);

        let bucket = window.granularity.bucket_expr("create_date");
        let pledged_sql = format!(
            r#"
            SELECT {bucket} AS period, SUM(amount) AS pledged
            FROM pledges
            WHERE create_date >= ? AND create_date <= ?
            GROUP BY period
            ORDER BY period ASC
            "#
        );

        let joined_bucket = window.granularity.bucket_expr("p.create_date");
        let actual_sql = format!(
            r#"
            SELECT {joined_bucket} AS period, SUM(c.total_amount) AS actual
            FROM pledges p
            JOIN pledge_payments pp ON pp.pledge_id = p.id
            JOIN contributions c ON c.id = pp.contribution_id
                AND c.status = 'completed'
            WHERE p.create_date >= ? AND p.create_date <= ?
            GROUP BY period
            "#
        );

        let pledged_rows = sqlx::query(&pledged_sql)
            .bind(&start)
            .bind(&end)
            .fetch_all(self.pool())
            .await?;

        let actual_rows = sqlx::query(&actual_sql)
            .bind(&start)
            .bind(&end)
            .fetch_all(self.pool())
            .await?;

        let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for row in pledged_rows {
            let period: String = row.try_get("period")?;
            let pledged: f64 = row.try_get("pledged")?;
            buckets.entry(period).or_insert((0.0, 0.0)).0 = pledged;
        }
        for row in actual_rows {
            let period: String = row.try_get("period")?;
            let actual: f64 = row.try_get("actual")?;
            buckets.entry(period).or_insert((0.0, 0.0)).1 = actual;
        }

        let data = buckets
            .into_iter()
            .map(|(period, (pledged_amount, actual_amount))| PledgeComparisonPoint {
                period,
                pledged_amount,
                actual_amount,
                fulfillment_rate: ratio_pct(actual_amount, pledged_amount),
            })
            .collect();

        Ok(data)
    }
}
