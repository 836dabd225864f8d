//! Aggregation engine for analytical report datasets
//!
//! One method per report type, each a pure function of the record store
//! contents and its time window. All queries are parameterized: window bounds
//! are bound as text and bucket expressions come from
//! [`crate::timewindow::Granularity`], the single source of truth for period
//! grouping.

pub mod campaigns;
pub mod donations;
pub mod donors;
pub mod memberships;

use crate::Result;
use crate::database::models::time_text;
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};

/// Computes report datasets from raw donor records
pub struct AggregationEngine {
    pool: SqlitePool,
}

impl AggregationEngine {
    /// Create a new aggregation engine over a record store pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Activity totals for the dashboard header
    ///
    /// Completed-contribution totals over the trailing year plus the active
    /// campaign count.
    pub async fn activity_totals(&self, now: NaiveDateTime) -> Result<ActivityTotals> {
        let year_ago = now - chrono::TimeDelta::days(365);

        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_contributions,
                COALESCE(SUM(total_amount), 0.0) AS total_amount,
                COUNT(DISTINCT contact_id) AS unique_donors
            FROM contributions
            WHERE status = 'completed'
              AND receive_date >= ?
            "#,
        )
        .bind(time_text::to_text(year_ago))
        .fetch_one(&self.pool)
        .await?;

        let active_campaigns = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM campaigns
            WHERE is_active = 1
              AND (end_date IS NULL OR end_date >= ?)
            "#,
        )
        .bind(time_text::to_text(start_of_day(now)))
        .fetch_one(&self.pool)
        .await?;

        Ok(ActivityTotals {
            total_contributions: row.try_get::<i64, _>("total_contributions")?,
            total_amount: row.try_get::<f64, _>("total_amount")?,
            unique_donors: row.try_get::<i64, _>("unique_donors")?,
            active_campaigns,
        })
    }
}

/// Trailing-year activity totals
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ActivityTotals {
    pub total_contributions: i64,
    pub total_amount: f64,
    pub unique_donors: i64,
    pub active_campaigns: i64,
}

/// Round to 2 decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage ratio, 0 when the denominator is not positive
pub(crate) fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        round2(numerator / denominator * 100.0)
    } else {
        0.0
    }
}

/// Midnight of the given instant's day
pub(crate) fn start_of_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(chrono::NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(25.0), 25.0);
    }

    #[test]
    fn test_ratio_pct_zero_denominator() {
        assert_eq!(ratio_pct(250.0, 0.0), 0.0);
        assert_eq!(ratio_pct(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_ratio_pct() {
        assert_eq!(ratio_pct(250.0, 1000.0), 25.0);
        assert_eq!(ratio_pct(1.0, 3.0), 33.33);
    }
}
