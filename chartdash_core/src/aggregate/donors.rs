//! Donor-cohort aggregations
//!
//! Lapsed donor value analysis and the year-over-year retention funnel.
//! Both ignore the symbolic time range: their horizons are fixed relative to
//! the reference instant.

use chrono::{Datelike, NaiveDateTime, TimeDelta};
use sqlx::Row;
use std::collections::{BTreeMap, HashMap};

use super::{AggregationEngine, ratio_pct};
use crate::Result;
use crate::database::models::time_text;
use crate::reports::{LapsedDonorYear, RetentionYear};

/// Days without a completed gift before a donor counts as lapsed
const LAPSED_CUTOFF_DAYS: i64 = 365;

/// Cohort years reported by the lapsed and retention views
const COHORT_YEARS: i32 = 5;

impl AggregationEngine {
    /// Donors whose most recent completed gift is older than the cutoff,
    /// grouped by the year they last gave
    ///
    /// Reports the five most recent lapse years, newest first, with the
    /// aggregate lifetime value walking out the door.
    pub async fn lapsed_donors(&self, now: NaiveDateTime) -> Result<Vec<LapsedDonorYear>> {
        let cutoff = now - TimeDelta::days(LAPSED_CUTOFF_DAYS);

        let rows = sqlx::query(
            r#"
            SELECT
                CAST(strftime('%Y', last_date) AS INTEGER) AS year,
                COUNT(*) AS donor_count,
                SUM(lifetime_total) AS total_value
            FROM (
                SELECT
                    contact_id,
                    MAX(receive_date) AS last_date,
                    SUM(total_amount) AS lifetime_total
                FROM contributions
                WHERE status = 'completed'
                GROUP BY contact_id
                HAVING MAX(receive_date) < ?
            )
            GROUP BY year
            ORDER BY year DESC
            LIMIT ?
            "#,
        )
        .bind(time_text::to_text(cutoff))
        .bind(COHORT_YEARS as i64)
        .fetch_all(self.pool())
        .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            data.push(LapsedDonorYear {
                year: row.try_get::<i64, _>("year")? as i32,
                lapsed_donors: row.try_get("donor_count")?,
                lost_value: row.try_get("total_value")?,
            });
        }

        Ok(data)
    }

    /// Retention funnel over first-gift cohort years
    ///
    /// A donor's cohort is the calendar year of their first completed gift;
    /// they are retained if they also gave in the following year. Cohorts are
    /// limited to the trailing five years, newest first.
    pub async fn donor_retention(&self, now: NaiveDateTime) -> Result<Vec<RetentionYear>> {
        let rows = sqlx::query(
            r#"
            SELECT
                contact_id,
                CAST(strftime('%Y', receive_date) AS INTEGER) AS year
            FROM contributions
            WHERE status = 'completed'
            GROUP BY contact_id, year
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        // Years each donor gave in
        let mut donor_years: HashMap<i64, Vec<i32>> = HashMap::new();
        for row in rows {
            let contact_id: i64 = row.try_get("contact_id")?;
            let year = row.try_get::<i64, _>("year")? as i32;
            donor_years.entry(contact_id).or_default().push(year);
        }

        let earliest_cohort = now.year() - COHORT_YEARS;
        let mut cohorts: BTreeMap<i32, (i64, i64)> = BTreeMap::new();

        for years in donor_years.values() {
            let Some(&first_year) = years.iter().min() else {
                continue;
            };
            if first_year < earliest_cohort {
                continue;
            }

            let retained = years.contains(&(first_year + 1));
            let entry = cohorts.entry(first_year).or_insert((0, 0));
            entry.0 += 1;
            if retained {
                entry.1 += 1;
            }
        }

        let data = cohorts
            .into_iter()
            .rev()
            .map(|(year, (new_donors, retained_donors))| RetentionYear {
                year,
                new_donors,
                retained_donors,
                retention_rate: ratio_pct(retained_donors as f64, new_donors as f64),
            })
            .collect();

        Ok(data)
    }
}
