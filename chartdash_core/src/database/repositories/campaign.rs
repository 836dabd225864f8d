//! Campaign repository implementation

use crate::Result;
use crate::database::models::{Campaign, time_text};
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};

use super::contribution::parse_dt;

/// Fields for a campaign being recorded
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub title: String,
    pub goal_amount: f64,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_active: bool,
}

/// Repository for campaign records
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    /// Create a new campaign repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a campaign, returning its row id
    pub async fn insert(&self, record: &NewCampaign) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO campaigns (title, goal_amount, start_date, end_date, is_active)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.title)
        .bind(record.goal_amount)
        .bind(time_text::to_text(record.start_date))
        .bind(record.end_date.map(time_text::to_text))
        .bind(record.is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a campaign by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, goal_amount, start_date, end_date, is_active
            FROM campaigns
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let start_date: String = row.try_get("start_date")?;
            let end_date: Option<String> = row.try_get("end_date")?;

            Ok(Campaign {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                goal_amount: row.try_get("goal_amount")?,
                start_date: parse_dt(&start_date)?,
                end_date: end_date.as_deref().map(parse_dt).transpose()?,
                is_active: row.try_get("is_active")?,
            })
        })
        .transpose()
    }

    /// Count all campaigns
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM campaigns")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_find_with_open_end_date() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
        let repo = CampaignRepository::new(db.pool().clone());

        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let id = repo
            .insert(&NewCampaign {
                title: "Spring Appeal".to_string(),
                goal_amount: 10_000.0,
                start_date: start,
                end_date: None,
                is_active: true,
            })
            .await
            .unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "Spring Appeal");
        assert_eq!(found.end_date, None);
        assert!(found.is_active);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
