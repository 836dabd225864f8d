//! Membership revenue aggregation

use sqlx::Row;

use super::AggregationEngine;
use crate::Result;
use crate::database::models::time_text;
use crate::reports::MembershipRevenueRow;
use crate::timewindow::TimeWindow;

impl AggregationEngine {
    /// Revenue by membership type for memberships started in the window
    ///
    /// Revenue is attributed through membership payment links to completed
    /// contributions; members without a completed payment do not appear.
    /// Ordered by revenue, highest first.
    pub async fn membership_revenue(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<MembershipRevenueRow>> {
        let rows = sqlx::query(
            r#"
            SELECT
                mt.name AS membership_type,
                COUNT(DISTINCT m.id) AS member_count,
                SUM(c.total_amount) AS revenue,
                AVG(c.total_amount) AS avg_fee
            FROM memberships m
            JOIN membership_types mt ON m.membership_type_id = mt.id
            JOIN membership_payments mp ON m.id = mp.membership_id
            JOIN contributions c ON mp.contribution_id = c.id
            WHERE m.start_date >= ? AND m.start_date <= ?
              AND c.status = 'completed'
            GROUP BY mt.id, mt.name
            ORDER BY revenue DESC
            "#,
        )
        .bind(time_text::to_text(window.start))
        .bind(time_text::to_text(window.end))
        .fetch_all(self.pool())
        .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            data.push(MembershipRevenueRow {
                membership_type: row.try_get("membership_type")?,
                member_count: row.try_get("member_count")?,
                revenue: row.try_get("revenue")?,
                avg_fee: row.try_get("avg_fee")?,
            });
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ContributionStatus;
    use crate::database::repositories::{
        ContributionRepository, MembershipRepository, NewContribution, NewMembership,
    };
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

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    async fn join_with_fee(
        db: &Database,
        contact_id: i64,
        type_name: &str,
        start: NaiveDateTime,
        fee: f64,
    ) {
        let memberships = MembershipRepository::new(db.pool().clone());
        let contributions = ContributionRepository::new(db.pool().clone());

        let type_id = memberships.ensure_type(type_name).await.unwrap();
        let membership_id = memberships
            .insert(&NewMembership {
                contact_id,
                membership_type_id: type_id,
                start_date: start,
            })
            .await
            .unwrap();

        let contribution_id = contributions
            .insert(&NewContribution {
                contact_id,
                campaign_id: None,
                recurring_id: None,
                total_amount: fee,
                receive_date: start,
                status: ContributionStatus::Completed,
            })
            .await
            .unwrap();

        memberships
            .add_payment(membership_id, contribution_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_membership_revenue_by_type() {
        let (db, _tmp) = create_test_db().await;
        let engine = AggregationEngine::new(db.pool().clone());

        join_with_fee(&db, 1, "Gold", at(2025, 6, 10), 200.0).await;
        join_with_fee(&db, 2, "Gold", at(2025, 6, 11), 100.0).await;
        join_with_fee(&db, 3, "Silver", at(2025, 6, 12), 50.0).await;

        let window = TimeWindow::resolve(TimeRange::Last7Days, now());
        let data = engine.membership_revenue(&window).await.unwrap();

        assert_eq!(data.len(), 2);
        // Highest revenue first
        assert_eq!(data[0].membership_type, "Gold");
        assert_eq!(data[0].member_count, 2);
        assert_eq!(data[0].revenue, 300.0);
        assert_eq!(data[0].avg_fee, 150.0);
        assert_eq!(data[1].membership_type, "Silver");
        assert_eq!(data[1].revenue, 50.0);
    }

    #[tokio::test]
    async fn test_membership_outside_window_excluded() {
        let (db, _tmp) = create_test_db().await;
        let engine = AggregationEngine::new(db.pool().clone());

        join_with_fee(&db, 1, "Gold", at(2024, 1, 1), 200.0).await;

        let window = TimeWindow::resolve(TimeRange::Last7Days, now());
        let data = engine.membership_revenue(&window).await.unwrap();
        assert!(data.is_empty());
    }
}
