//! Time-window resolution for report aggregation
//!
//! Maps symbolic range tokens (e.g. "7days") to concrete timestamp intervals
//! and to the bucketing granularity used for period grouping. This module is
//! the single source of truth for both mappings: aggregation queries never
//! hardcode their own bucket formats.

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Symbolic time range selector
///
/// The token set is closed; [`TimeRange::from_token`] is total and maps
/// unknown tokens to [`TimeRange::Last7Days`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24hr")]
    Last24Hours,
    #[serde(rename = "2days")]
    Last2Days,
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "1month")]
    LastMonth,
    #[serde(rename = "3months")]
    Last3Months,
    #[serde(rename = "6months")]
    Last6Months,
    #[serde(rename = "1year")]
    LastYear,
}

impl TimeRange {
    /// All known range tokens
    pub const ALL: [TimeRange; 7] = [
        TimeRange::Last24Hours,
        TimeRange::Last2Days,
        TimeRange::Last7Days,
        TimeRange::LastMonth,
        TimeRange::Last3Months,
        TimeRange::Last6Months,
        TimeRange::LastYear,
    ];

    /// The common subset used for cache warm-up
    pub const WARMUP_DEFAULTS: [TimeRange; 5] = [
        TimeRange::Last24Hours,
        TimeRange::Last7Days,
        TimeRange::LastMonth,
        TimeRange::Last3Months,
        TimeRange::LastYear,
    ];

    /// Parse a range token, falling back to `7days` for unknown input
    pub fn from_token(token: &str) -> Self {
        match token {
            "24hr" => Self::Last24Hours,
            "2days" => Self::Last2Days,
            "7days" => Self::Last7Days,
            "1month" => Self::LastMonth,
            "3months" => Self::Last3Months,
            "6months" => Self::Last6Months,
            "1year" => Self::LastYear,
            _ => Self::Last7Days,
        }
    }

    /// The canonical token for this range
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Last24Hours => "24hr",
            Self::Last2Days => "2days",
            Self::Last7Days => "7days",
            Self::LastMonth => "1month",
            Self::Last3Months => "3months",
            Self::Last6Months => "6months",
            Self::LastYear => "1year",
        }
    }

    /// Human-readable label, as presented by range selectors
    pub fn label(&self) -> &'static str {
        match self {
            Self::Last24Hours => "Last 24 Hours",
            Self::Last2Days => "Last 2 Days",
            Self::Last7Days => "Last 7 Days",
            Self::LastMonth => "Last Month",
            Self::Last3Months => "Last 3 Months",
            Self::Last6Months => "Last 6 Months",
            Self::LastYear => "Last Year",
        }
    }

    /// Bucketing granularity for this range
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Last24Hours | Self::Last2Days => Granularity::Hour,
            Self::Last7Days | Self::LastMonth => Granularity::Day,
            Self::Last3Months | Self::Last6Months => Granularity::IsoWeek,
            Self::LastYear => Granularity::Month,
        }
    }

    fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Last24Hours => today - TimeDelta::days(1),
            Self::Last2Days => today - TimeDelta::days(2),
            Self::Last7Days => today - TimeDelta::days(7),
            Self::LastMonth => today.checked_sub_months(Months::new(1)).unwrap_or(today),
            Self::Last3Months => today.checked_sub_months(Months::new(3)).unwrap_or(today),
            Self::Last6Months => today.checked_sub_months(Months::new(6)).unwrap_or(today),
            Self::LastYear => today.checked_sub_months(Months::new(12)).unwrap_or(today),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Period grouping granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Hour,
    Day,
    IsoWeek,
    Month,
}

impl Granularity {
    /// SQL expression bucketing a datetime column into this granularity
    ///
    /// The format strings are fixed; `column` is always a literal column
    /// reference supplied by the query site, never external input.
    pub fn bucket_expr(&self, column: &'static str) -> String {
        match self {
            Self::Hour => format!("strftime('%Y-%m-%d %H:00:00', {column})"),
            Self::Day => format!("strftime('%Y-%m-%d', {column})"),
            Self::IsoWeek => format!("strftime('%Y-%W', {column})"),
            Self::Month => format!("strftime('%Y-%m', {column})"),
        }
    }
}

/// A concrete aggregation window
///
/// Both bounds are inclusive: records are selected with
/// `date >= start AND date <= end`. The same convention applies to every
/// report type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub range: TimeRange,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub granularity: Granularity,
}

impl TimeWindow {
    /// Resolve a range token against a reference instant
    ///
    /// `end` is the end of the current day (23:59:59); `start` is midnight of
    /// the day `range` reaches back to. Pure function of its arguments.
    pub fn resolve(range: TimeRange, now: NaiveDateTime) -> Self {
        let today = now.date();
        let end = today.and_hms_opt(23, 59, 59).unwrap_or_default();
        let start = range.start_date(today).and_time(NaiveTime::MIN);

        Self {
            range,
            start,
            end,
            granularity: range.granularity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_resolve_start_before_end_for_all_ranges() {
        for range in TimeRange::ALL {
            let window = TimeWindow::resolve(range, fixed_now());
            assert!(window.start < window.end, "range {range} produced empty window");
        }
    }

    #[test]
    fn test_resolve_end_is_end_of_day() {
        let window = TimeWindow::resolve(TimeRange::Last7Days, fixed_now());
        assert_eq!(
            window.end,
            NaiveDate::from_ymd_opt(2025, 6, 15)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap()
        );
    }

    #[test]
    fn test_resolve_seven_day_start() {
        let window = TimeWindow::resolve(TimeRange::Last7Days, fixed_now());
        assert_eq!(
            window.start,
            NaiveDate::from_ymd_opt(2025, 6, 8)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_resolve_calendar_month_clamps() {
        // Mar 31 minus one month clamps to Feb 28 in a non-leap year
        let now = NaiveDate::from_ymd_opt(2025, 3, 31)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let window = TimeWindow::resolve(TimeRange::LastMonth, now);
        assert_eq!(
            window.start.date(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_granularity_mapping() {
        assert_eq!(TimeRange::Last24Hours.granularity(), Granularity::Hour);
        assert_eq!(TimeRange::Last2Days.granularity(), Granularity::Hour);
        assert_eq!(TimeRange::Last7Days.granularity(), Granularity::Day);
        assert_eq!(TimeRange::LastMonth.granularity(), Granularity::Day);
        assert_eq!(TimeRange::Last3Months.granularity(), Granularity::IsoWeek);
        assert_eq!(TimeRange::Last6Months.granularity(), Granularity::IsoWeek);
        assert_eq!(TimeRange::LastYear.granularity(), Granularity::Month);
    }

    #[test]
    fn test_unknown_token_falls_back_to_seven_days() {
        assert_eq!(TimeRange::from_token("fortnight"), TimeRange::Last7Days);
        assert_eq!(TimeRange::from_token(""), TimeRange::Last7Days);
    }

    #[test]
    fn test_token_round_trip() {
        for range in TimeRange::ALL {
            assert_eq!(TimeRange::from_token(range.as_token()), range);
        }
    }

    #[test]
    fn test_bucket_expr_uses_column() {
        let expr = Granularity::Day.bucket_expr("receive_date");
        assert_eq!(expr, "strftime('%Y-%m-%d', receive_date)");

        let expr = Granularity::Hour.bucket_expr("c.receive_date");
        assert!(expr.contains("%H:00:00"));
    }

    #[test]
    fn test_serde_token_names() {
        let json = serde_json::to_string(&TimeRange::Last3Months).unwrap();
        assert_eq!(json, "\"3months\"");
        let parsed: TimeRange = serde_json::from_str("\"1year\"").unwrap();
        assert_eq!(parsed, TimeRange::LastYear);
    }

    proptest! {
        #[test]
        fn prop_from_token_is_total(token in ".*") {
            // Parsing never panics and always yields a window with start < end
            let range = TimeRange::from_token(&token);
            let window = TimeWindow::resolve(range, fixed_now());
            prop_assert!(window.start < window.end);
        }
    }
}
