//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the dashboard record
//! store, the chart cache table, and the alert log.

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Initial schema creation SQL
///
/// All datetime columns hold TEXT in `YYYY-MM-DD HH:MM:SS` form so that
/// lexicographic comparison matches chronological order and `strftime`
/// bucketing applies directly.
pub const SCHEMA_V1: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- Contribution records
CREATE TABLE IF NOT EXISTS contributions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL,
    campaign_id INTEGER,
    recurring_id INTEGER,
    total_amount REAL NOT NULL,
    receive_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Recurring contribution agreements
CREATE TABLE IF NOT EXISTS recurring_contributions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    frequency TEXT NOT NULL DEFAULT 'month',
    created_at TEXT NOT NULL
);

-- Fundraising campaigns
CREATE TABLE IF NOT EXISTS campaigns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    goal_amount REAL NOT NULL DEFAULT 0,
    start_date TEXT NOT NULL,
    end_date TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE
);

-- Pledges and their payment links
CREATE TABLE IF NOT EXISTS pledges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    create_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pledge_payments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pledge_id INTEGER NOT NULL,
    contribution_id INTEGER NOT NULL,
    FOREIGN KEY (pledge_id) REFERENCES pledges(id) ON DELETE CASCADE,
    FOREIGN KEY (contribution_id) REFERENCES contributions(id) ON DELETE CASCADE
);

-- Memberships and their payment links
CREATE TABLE IF NOT EXISTS membership_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS memberships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL,
    membership_type_id INTEGER NOT NULL,
    start_date TEXT NOT NULL,
    FOREIGN KEY (membership_type_id) REFERENCES membership_types(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS membership_payments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    membership_id INTEGER NOT NULL,
    contribution_id INTEGER NOT NULL,
    FOREIGN KEY (membership_id) REFERENCES memberships(id) ON DELETE CASCADE,
    FOREIGN KEY (contribution_id) REFERENCES contributions(id) ON DELETE CASCADE
);

-- Chart dataset cache
CREATE TABLE IF NOT EXISTS chart_cache (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cache_key TEXT NOT NULL UNIQUE,
    cache_data TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Alert dispatch log, retention-capped by cleanup
CREATE TABLE IF NOT EXISTS alert_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    alert_type TEXT NOT NULL,
    alert_data TEXT NOT NULL,
    sent_to TEXT NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    sent_at TEXT NOT NULL
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_contributions_receive_date ON contributions(receive_date);
CREATE INDEX IF NOT EXISTS idx_contributions_status ON contributions(status);
CREATE INDEX IF NOT EXISTS idx_contributions_contact_id ON contributions(contact_id);
CREATE INDEX IF NOT EXISTS idx_contributions_campaign_id ON contributions(campaign_id);

CREATE INDEX IF NOT EXISTS idx_pledges_create_date ON pledges(create_date);
CREATE INDEX IF NOT EXISTS idx_pledge_payments_pledge_id ON pledge_payments(pledge_id);

CREATE INDEX IF NOT EXISTS idx_memberships_start_date ON memberships(start_date);
CREATE INDEX IF NOT EXISTS idx_membership_payments_membership_id ON membership_payments(membership_id);

CREATE INDEX IF NOT EXISTS idx_chart_cache_key ON chart_cache(cache_key);
CREATE INDEX IF NOT EXISTS idx_chart_cache_expires_at ON chart_cache(expires_at);

CREATE INDEX IF NOT EXISTS idx_alert_log_sent_at ON alert_log(sent_at);
"#;
