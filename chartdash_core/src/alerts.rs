//! Alert dispatch and audit log
//!
//! Alerting is strictly best-effort: transport failures are logged and
//! swallowed, and dashboard or cache operations are never blocked by an
//! alert going wrong. Every dispatch attempt is appended to the alert log,
//! which `enforce_retention` caps at the most recent entries.

use crate::Result;
use crate::config::SettingsProvider;
use crate::database::models::{AlertLogEntry, time_text};
use crate::database::repositories::contribution::parse_dt;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Maximum alert log rows kept by the retention sweep
pub const ALERT_RETENTION_LIMIT: i64 = 1000;

/// Alert categories the dashboard raises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    LowDonations,
    GoalAchieved,
    DonorRetention,
}

impl AlertType {
    /// Stored log value for this alert type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowDonations => "low_donations",
            Self::GoalAchieved => "goal_achieved",
            Self::DonorRetention => "donor_retention",
        }
    }

    fn subject(&self, data: &serde_json::Value) -> String {
        let today = time_text::now().date();
        match self {
            Self::LowDonations => format!("Low Donation Alert - {today}"),
            Self::GoalAchieved => {
                let campaign = data
                    .get("campaign_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Campaign");
                format!("Campaign Goal Achievement - {campaign}")
            }
            Self::DonorRetention => format!("Donor Retention Alert - {today}"),
        }
    }

    fn body(&self, data: &serde_json::Value) -> String {
        let field = |name: &str| {
            data.get(name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        };

        match self {
            Self::LowDonations => format!(
                "Daily donations have fallen below the configured threshold.\n\
                 Current amount: {}\nThreshold: {}\nDate: {}",
                field("current_amount"),
                field("threshold"),
                field("date"),
            ),
            Self::GoalAchieved => format!(
                "A campaign has reached its goal threshold.\n\
                 Campaign: {}\nProgress: {}%\nRaised: {}\nGoal: {}",
                field("campaign_name"),
                field("progress"),
                field("raised"),
                field("goal"),
            ),
            Self::DonorRetention => format!(
                "Donor retention has crossed an alert threshold.\nDetails: {data}"
            ),
        }
    }
}

/// Outgoing alert transport, provided by the mail collaborator
#[async_trait]
pub trait AlertTransport: Send + Sync {
    /// Deliver one alert message to one recipient
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Dispatches alerts and maintains the audit log
pub struct AlertService {
    pool: SqlitePool,
    settings: Arc<SettingsProvider>,
    transport: Arc<dyn AlertTransport>,
}

impl AlertService {
    /// Create an alert service
    pub fn new(
        pool: SqlitePool,
        settings: Arc<SettingsProvider>,
        transport: Arc<dyn AlertTransport>,
    ) -> Self {
        Self {
            pool,
            settings,
            transport,
        }
    }

    /// Dispatch an alert to the given recipients
    ///
    /// Falls back to the configured alert address when no recipients are
    /// passed. Returns true only when alerting is enabled, at least one
    /// recipient exists, and every delivery succeeded. Each attempt is
    /// logged individually.
    pub async fn send_alert(
        &self,
        alert: AlertType,
        data: &serde_json::Value,
        recipients: Option<&[String]>,
    ) -> bool {
        let settings = self.settings.current();
        if !settings.enable_alerts {
            return false;
        }

        let recipients: Vec<String> = match recipients {
            Some(list) => list.to_vec(),
            None => settings.alert_email.into_iter().collect(),
        };
        let recipients: Vec<&str> = recipients
            .iter()
            .map(String::as_str)
            .filter(|r| !r.is_empty())
            .collect();

        if recipients.is_empty() {
            return false;
        }

        let subject = alert.subject(data);
        let body = alert.body(data);
        let mut all_sent = true;

        for recipient in recipients {
            match self.transport.send(recipient, &subject, &body).await {
                Ok(()) => {
                    self.log_attempt(alert, data, recipient, "sent", None).await;
                }
                Err(e) => {
                    log::warn!("Alert delivery to {recipient} failed: {e}");
                    self.log_attempt(alert, data, recipient, "failed", Some(&e.to_string()))
                        .await;
                    all_sent = false;
                }
            }
        }

        all_sent
    }

    /// Append one dispatch attempt to the log; logging failures are swallowed
    async fn log_attempt(
        &self,
        alert: AlertType,
        data: &serde_json::Value,
        sent_to: &str,
        status: &str,
        error_message: Option<&str>,
    ) {
        let result = sqlx::query(
            r#"
            INSERT INTO alert_log (alert_type, alert_data, sent_to, status, error_message, sent_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(alert.as_str())
        .bind(data.to_string())
        .bind(sent_to)
        .bind(status)
        .bind(error_message)
        .bind(time_text::to_text(time_text::now()))
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            log::warn!("Failed to record alert log entry: {e}");
        }
    }

    /// Most recent log entries, newest first
    pub async fn recent(&self, limit: i64) -> Result<Vec<AlertLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, alert_type, alert_data, sent_to, status, error_message, sent_at
            FROM alert_log
            ORDER BY sent_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let sent_at: String = row.try_get("sent_at")?;
            entries.push(AlertLogEntry {
                id: row.try_get("id")?,
                alert_type: row.try_get("alert_type")?,
                alert_data: row.try_get("alert_data")?,
                sent_to: row.try_get("sent_to")?,
                status: row.try_get("status")?,
                error_message: row.try_get("error_message")?,
                sent_at: parse_dt(&sent_at)?,
            });
        }

        Ok(entries)
    }

    /// Drop all but the most recent entries, returning the count removed
    pub async fn enforce_retention(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM alert_log
            WHERE id NOT IN (
                SELECT id FROM alert_log
                ORDER BY sent_at DESC, id DESC
                LIMIT ?
            )
            "#,
        )
        .bind(ALERT_RETENTION_LIMIT)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
