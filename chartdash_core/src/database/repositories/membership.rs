//! Membership repository implementation

use crate::Result;
use crate::database::models::{Membership, time_text};
use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};

use super::contribution::parse_dt;

/// Fields for a membership being recorded
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub contact_id: i64,
    pub membership_type_id: i64,
    pub start_date: NaiveDateTime,
}

/// Repository for memberships, membership types, and payment links
pub struct MembershipRepository {
    pool: SqlitePool,
}

impl MembershipRepository {
    /// Create a new membership repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a membership type by name, creating it if missing
    pub async fn ensure_type(&self, name: &str) -> Result<i64> {
        sqlx::query("INSERT OR IGNORE INTO membership_types (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM membership_types WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    /// Insert a membership, returning its row id
    pub async fn insert(&self, record: &NewMembership) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO memberships (contact_id, membership_type_id, start_date) VALUES (?, ?, ?)",
        )
        .bind(record.contact_id)
        .bind(record.membership_type_id)
        .bind(time_text::to_text(record.start_date))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Link a contribution to a membership as a payment
    pub async fn add_payment(&self, membership_id: i64, contribution_id: i64) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO membership_payments (membership_id, contribution_id) VALUES (?, ?)",
        )
        .bind(membership_id)
        .bind(contribution_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a membership by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Membership>> {
        let row = sqlx::query(
            "SELECT id, contact_id, membership_type_id, start_date FROM memberships WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let start_date: String = row.try_get("start_date")?;

            Ok(Membership {
                id: row.try_get("id")?,
                contact_id: row.try_get("contact_id")?,
                membership_type_id: row.try_get("membership_type_id")?,
                start_date: parse_dt(&start_date)?,
            })
        })
        .transpose()
    }
}
