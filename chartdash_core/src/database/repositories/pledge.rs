//! Pledge repository implementation

use crate::Result;
use crate::database::models::{Pledge, time_text};
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};

use super::contribution::parse_dt;

/// Fields for a pledge being recorded
#[derive(Debug, Clone)]
pub struct NewPledge {
    pub contact_id: i64,
    pub amount: f64,
    pub create_date: NaiveDateTime,
}

/// Repository for pledges and their payment links
pub struct PledgeRepository {
    pool: SqlitePool,
}

impl PledgeRepository {
    /// Create a new pledge repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pledge, returning its row id
    pub async fn insert(&self, record: &NewPledge) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO pledges (contact_id, amount, create_date) VALUES (?, ?, ?)",
        )
        .bind(record.contact_id)
        .bind(record.amount)
        .bind(time_text::to_text(record.create_date))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Link a contribution to a pledge as a payment
    pub async fn add_payment(&self, pledge_id: i64, contribution_id: i64) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO pledge_payments (pledge_id, contribution_id) VALUES (?, ?)",
        )
        .bind(pledge_id)
        .bind(contribution_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a pledge by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Pledge>> {
        let row = sqlx::query(
            "SELECT id, contact_id, amount, create_date FROM pledges WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let create_date: String = row.try_get("create_date")?;

            Ok(Pledge {
                id: row.try_get("id")?,
                contact_id: row.try_get("contact_id")?,
                amount: row.try_get("amount")?,
                create_date: parse_dt(&create_date)?,
            })
        })
        .transpose()
    }
}
