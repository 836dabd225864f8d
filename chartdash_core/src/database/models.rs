//! Database model definitions
//!
//! This module contains all data structures that map to database tables.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Contribution status enum
///
/// Only [`ContributionStatus::Completed`] records participate in any
/// aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum ContributionStatus {
    #[sqlx(rename = "completed")]
    Completed,
    #[sqlx(rename = "pending")]
    Pending,
    #[sqlx(rename = "failed")]
    Failed,
    #[sqlx(rename = "cancelled")]
    Cancelled,
    #[sqlx(rename = "refunded")]
    Refunded,
}

impl ContributionStatus {
    /// Stored column value for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

/// Contribution record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: i64,
    pub contact_id: i64,
    pub campaign_id: Option<i64>,
    pub recurring_id: Option<i64>,
    pub total_amount: f64,
    pub receive_date: NaiveDateTime,
    pub status: ContributionStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Recurring contribution agreement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringContribution {
    pub id: i64,
    pub contact_id: i64,
    pub amount: f64,
    pub frequency: String,
    pub created_at: NaiveDateTime,
}

/// Fundraising campaign record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub title: String,
    pub goal_amount: f64,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_active: bool,
}

/// Pledge record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pledge {
    pub id: i64,
    pub contact_id: i64,
    pub amount: f64,
    pub create_date: NaiveDateTime,
}

/// Membership record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    pub contact_id: i64,
    pub membership_type_id: i64,
    pub start_date: NaiveDateTime,
}

/// Alert log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub id: i64,
    pub alert_type: String,
    pub alert_data: String,
    pub sent_to: String,
    pub status: String,
    pub error_message: Option<String>,
    pub sent_at: NaiveDateTime,
}

/// Helper functions for datetime-to-text conversion
///
/// All datetime columns are stored as `YYYY-MM-DD HH:MM:SS` text. Query
/// parameters are bound through these helpers so that lexicographic
/// comparison in SQL matches chronological order.
pub mod time_text {
    use chrono::{NaiveDateTime, Utc};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Format a datetime for storage or binding
    pub fn to_text(dt: NaiveDateTime) -> String {
        dt.format(FORMAT).to_string()
    }

    /// Parse a stored datetime
    pub fn from_text(text: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, FORMAT).ok()
    }

    /// Current instant, truncated to seconds
    pub fn now() -> NaiveDateTime {
        let now = Utc::now().naive_utc();
        from_text(&to_text(now)).unwrap_or(now)
    }
}
