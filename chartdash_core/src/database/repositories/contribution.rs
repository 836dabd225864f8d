//! Contribution repository implementation

use crate::Result;
use crate::database::models::{Contribution, ContributionStatus, time_text};
use crate::error::{Error, InternalError};
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};

/// Fields for a contribution being recorded
#[derive(Debug, Clone)]
pub struct NewContribution {
    pub contact_id: i64,
    pub campaign_id: Option<i64>,
    pub recurring_id: Option<i64>,
    pub total_amount: f64,
    pub receive_date: NaiveDateTime,
    pub status: ContributionStatus,
}

/// Repository for contribution records
pub struct ContributionRepository {
    pool: SqlitePool,
}

impl ContributionRepository {
    /// Create a new contribution repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a contribution, returning its row id
    pub async fn insert(&self, record: &NewContribution) -> Result<i64> {
        let now = time_text::to_text(time_text::now());

        let result = sqlx::query(
            r#"
            INSERT INTO contributions
                (contact_id, campaign_id, recurring_id, total_amount, receive_date,
                 status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.contact_id)
        .bind(record.campaign_id)
        .bind(record.recurring_id)
        .bind(record.total_amount)
        .bind(time_text::to_text(record.receive_date))
        .bind(record.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a contribution by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Contribution>> {
        let row = sqlx::query(
            r#"
            SELECT id, contact_id, campaign_id, recurring_id, total_amount,
                   receive_date, status, created_at, updated_at
            FROM contributions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::map_row).transpose()
    }

    /// Completed contributions inside an inclusive window, oldest first
    pub async fn find_completed_in_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Contribution>> {
        let rows = sqlx::query(
            r#"
            SELECT id, contact_id, campaign_id, recurring_id, total_amount,
                   receive_date, status, created_at, updated_at
            FROM contributions
            WHERE status = 'completed'
              AND receive_date >= ? AND receive_date <= ?
            ORDER BY receive_date ASC
            "#,
        )
        .bind(time_text::to_text(start))
        .bind(time_text::to_text(end))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::map_row).collect()
    }

    /// Insert a recurring contribution agreement, returning its row id
    ///
    /// Contributions reference the agreement through `recurring_id`; the
    /// recurring-vs-one-time split classifies by that link.
    pub async fn insert_recurring_agreement(
        &self,
        contact_id: i64,
        amount: f64,
        frequency: &str,
    ) -> Result<i64> {
        let now = time_text::to_text(time_text::now());

        let result = sqlx::query(
            r#"
            INSERT INTO recurring_contributions (contact_id, amount, frequency, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(contact_id)
        .bind(amount)
        .bind(frequency)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Count all contributions
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contributions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    fn map_row(row: sqlx::sqlite::SqliteRow) -> Result<Contribution> {
        let receive_date: String = row.try_get("receive_date")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Contribution {
            id: row.try_get("id")?,
            contact_id: row.try_get("contact_id")?,
            campaign_id: row.try_get("campaign_id")?,
            recurring_id: row.try_get("recurring_id")?,
            total_amount: row.try_get("total_amount")?,
            receive_date: parse_dt(&receive_date)?,
            status: row.try_get("status")?,
            created_at: parse_dt(&created_at)?,
            updated_at: parse_dt(&updated_at)?,
        })
    }
}

pub(crate) fn parse_dt(text: &str) -> Result<NaiveDateTime> {
    time_text::from_text(text).ok_or_else(|| {
        Error::Internal(InternalError::assertion(format!(
            "Unparseable stored datetime: {text}"
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
        (db, temp_dir)
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (db, _temp_dir) = create_test_db().await;
        let repo = ContributionRepository::new(db.pool().clone());

        let id = repo
            .insert(&NewContribution {
                contact_id: 7,
                campaign_id: None,
                recurring_id: None,
                total_amount: 50.0,
                receive_date: at(2025, 3, 1),
                status: ContributionStatus::Completed,
            })
            .await
            .unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.contact_id, 7);
        assert_eq!(found.total_amount, 50.0);
        assert_eq!(found.status, ContributionStatus::Completed);
        assert_eq!(found.receive_date, at(2025, 3, 1));
    }

    #[tokio::test]
    async fn test_window_filter_excludes_pending() {
        let (db, _temp_dir) = create_test_db().await;
        let repo = ContributionRepository::new(db.pool().clone());

        for status in [ContributionStatus::Completed, ContributionStatus::Pending] {
            repo.insert(&NewContribution {
                contact_id: 1,
                campaign_id: None,
                recurring_id: None,
                total_amount: 10.0,
                receive_date: at(2025, 3, 2),
                status,
            })
            .await
            .unwrap();
        }

        let found = repo
            .find_completed_in_window(at(2025, 3, 1), at(2025, 3, 3))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, ContributionStatus::Completed);

        // The plain count sees every status
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
