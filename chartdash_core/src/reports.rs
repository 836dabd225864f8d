//! Report catalog and dataset types
//!
//! The eight analytical report variants are a closed enumeration: dispatch is
//! exhaustive at compile time, and unknown string keys are a caller error
//! rather than a cache miss.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationError};

/// The closed set of analytical report types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    #[serde(rename = "realtime_donations")]
    RealtimeDonations,
    #[serde(rename = "recurring_vs_onetime")]
    RecurringVsOnetime,
    #[serde(rename = "lapsed_donors")]
    LapsedDonors,
    #[serde(rename = "donor_retention")]
    DonorRetention,
    #[serde(rename = "avg_gift_trend")]
    AvgGiftTrend,
    #[serde(rename = "campaign_progress")]
    CampaignProgress,
    #[serde(rename = "pledged_vs_actual")]
    PledgedVsActual,
    #[serde(rename = "membership_revenue")]
    MembershipRevenue,
}

impl ReportType {
    /// All known report types, in catalog order
    pub const ALL: [ReportType; 8] = [
        ReportType::RealtimeDonations,
        ReportType::RecurringVsOnetime,
        ReportType::LapsedDonors,
        ReportType::DonorRetention,
        ReportType::AvgGiftTrend,
        ReportType::CampaignProgress,
        ReportType::PledgedVsActual,
        ReportType::MembershipRevenue,
    ];

    /// Parse a report key; unknown keys are a caller error
    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "realtime_donations" => Ok(Self::RealtimeDonations),
            "recurring_vs_onetime" => Ok(Self::RecurringVsOnetime),
            "lapsed_donors" => Ok(Self::LapsedDonors),
            "donor_retention" => Ok(Self::DonorRetention),
            "avg_gift_trend" => Ok(Self::AvgGiftTrend),
            "campaign_progress" => Ok(Self::CampaignProgress),
            "pledged_vs_actual" => Ok(Self::PledgedVsActual),
            "membership_revenue" => Ok(Self::MembershipRevenue),
            _ => Err(Error::Validation(ValidationError::unknown_report_type(key))),
        }
    }

    /// The canonical key for this report type
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::RealtimeDonations => "realtime_donations",
            Self::RecurringVsOnetime => "recurring_vs_onetime",
            Self::LapsedDonors => "lapsed_donors",
            Self::DonorRetention => "donor_retention",
            Self::AvgGiftTrend => "avg_gift_trend",
            Self::CampaignProgress => "campaign_progress",
            Self::PledgedVsActual => "pledged_vs_actual",
            Self::MembershipRevenue => "membership_revenue",
        }
    }

    /// Static catalog entry for this report type
    pub fn info(&self) -> ReportInfo {
        use ChartRendering::*;

        match self {
            Self::RealtimeDonations => ReportInfo {
                title: "Real-Time Donation Dashboard",
                description: "Visual real-time display of donation totals, goals, and progress bars",
                chart_renderings: &[Line, Bar],
                supports_time_range: true,
            },
            Self::RecurringVsOnetime => ReportInfo {
                title: "Recurring vs One-Time Contributions",
                description: "Visual comparison of recurring vs. one-time donations over time",
                chart_renderings: &[StackedBar, Line],
                supports_time_range: true,
            },
            Self::LapsedDonors => ReportInfo {
                title: "Lapsed Donor Value Analysis",
                description: "Charts showing donation drop-offs by year, cohort, or segment",
                chart_renderings: &[Bar, Pie],
                supports_time_range: false,
            },
            Self::DonorRetention => ReportInfo {
                title: "Donor Retention Funnel",
                description: "Visualisation of how many donors give again year over year",
                chart_renderings: &[Funnel, Bar],
                supports_time_range: false,
            },
            Self::AvgGiftTrend => ReportInfo {
                title: "Average Gift Size Over Time",
                description: "Insightful trend lines showing how average donation amounts evolve",
                chart_renderings: &[Line, Area],
                supports_time_range: true,
            },
            Self::CampaignProgress => ReportInfo {
                title: "Campaign-Specific Fundraising Progress",
                description: "Visual goal progress charts for active campaigns",
                chart_renderings: &[Progress, HorizontalBar],
                supports_time_range: false,
            },
            Self::PledgedVsActual => ReportInfo {
                title: "Pledged vs Actual Income",
                description: "Bar charts comparing expected pledges and actual receipts",
                chart_renderings: &[GroupedBar, Line],
                supports_time_range: true,
            },
            Self::MembershipRevenue => ReportInfo {
                title: "Membership Revenue Breakdown by Type",
                description: "Revenue analysis by membership type and category",
                chart_renderings: &[Pie, Doughnut, Bar],
                supports_time_range: true,
            },
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Catalog metadata for one report type
#[derive(Debug, Clone, Serialize)]
pub struct ReportInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub chart_renderings: &'static [ChartRendering],
    pub supports_time_range: bool,
}

/// Chart renderings the presentation layer may choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRendering {
    Line,
    Bar,
    StackedBar,
    GroupedBar,
    HorizontalBar,
    Pie,
    Doughnut,
    Area,
    Progress,
    Funnel,
}

/// One bucket of the real-time donation series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationPoint {
    pub date: String,
    pub amount: f64,
    pub count: i64,
    pub avg_amount: f64,
}

/// Window-wide totals accompanying the real-time donation series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationSummary {
    pub total_amount: f64,
    pub total_count: i64,
    pub avg_donation: f64,
    pub time_range: String,
}

/// Real-time donation dataset: per-bucket series plus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTimeDonations {
    pub chart_data: Vec<DonationPoint>,
    pub summary: DonationSummary,
}

/// One bucket of the recurring/one-time split, dense over both classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSplitPoint {
    pub date: String,
    pub recurring_amount: f64,
    pub one_time_amount: f64,
    pub recurring_count: i64,
    pub one_time_count: i64,
}

/// Donors grouped by the year of their last gift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapsedDonorYear {
    pub year: i32,
    pub lapsed_donors: i64,
    pub lost_value: f64,
}

/// Retention funnel row for one first-gift cohort year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionYear {
    pub year: i32,
    pub new_donors: i64,
    pub retained_donors: i64,
    pub retention_rate: f64,
}

/// One bucket of the average gift trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftTrendPoint {
    pub period: String,
    pub avg_gift_size: f64,
    pub donation_count: i64,
    pub min_gift: f64,
    pub max_gift: f64,
}

/// Progress of one active campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignProgressRow {
    pub campaign_id: i64,
    pub campaign_name: String,
    pub goal_amount: f64,
    pub raised_amount: f64,
    pub donation_count: i64,
    pub progress_percentage: f64,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// One bucket comparing pledged and fulfilled amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PledgeComparisonPoint {
    pub period: String,
    pub pledged_amount: f64,
    pub actual_amount: f64,
    pub fulfillment_rate: f64,
}

/// Revenue attributed to one membership type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRevenueRow {
    pub membership_type: String,
    pub member_count: i64,
    pub revenue: f64,
    pub avg_fee: f64,
}

/// A computed analytical dataset, one variant per report type
///
/// Datasets are immutable once produced; the cache stores them serialized and
/// returns them as-is on a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", content = "data")]
pub enum ReportDataset {
    #[serde(rename = "realtime_donations")]
    RealtimeDonations(RealTimeDonations),
    #[serde(rename = "recurring_vs_onetime")]
    RecurringVsOnetime(Vec<RecurringSplitPoint>),
    #[serde(rename = "lapsed_donors")]
    LapsedDonors(Vec<LapsedDonorYear>),
    #[serde(rename = "donor_retention")]
    DonorRetention(Vec<RetentionYear>),
    #[serde(rename = "avg_gift_trend")]
    AvgGiftTrend(Vec<GiftTrendPoint>),
    #[serde(rename = "campaign_progress")]
    CampaignProgress(Vec<CampaignProgressRow>),
    #[serde(rename = "pledged_vs_actual")]
    PledgedVsActual(Vec<PledgeComparisonPoint>),
    #[serde(rename = "membership_revenue")]
    MembershipRevenue(Vec<MembershipRevenueRow>),
}

impl ReportDataset {
    /// The report type this dataset belongs to
    pub fn report_type(&self) -> ReportType {
        match self {
            Self::RealtimeDonations(_) => ReportType::RealtimeDonations,
            Self::RecurringVsOnetime(_) => ReportType::RecurringVsOnetime,
            Self::LapsedDonors(_) => ReportType::LapsedDonors,
            Self::DonorRetention(_) => ReportType::DonorRetention,
            Self::AvgGiftTrend(_) => ReportType::AvgGiftTrend,
            Self::CampaignProgress(_) => ReportType::CampaignProgress,
            Self::PledgedVsActual(_) => ReportType::PledgedVsActual,
            Self::MembershipRevenue(_) => ReportType::MembershipRevenue,
        }
    }

    /// Number of data points in the primary series
    pub fn len(&self) -> usize {
        match self {
            Self::RealtimeDonations(d) => d.chart_data.len(),
            Self::RecurringVsOnetime(d) => d.len(),
            Self::LapsedDonors(d) => d.len(),
            Self::DonorRetention(d) => d.len(),
            Self::AvgGiftTrend(d) => d.len(),
            Self::CampaignProgress(d) => d.len(),
            Self::PledgedVsActual(d) => d.len(),
            Self::MembershipRevenue(d) => d.len(),
        }
    }

    /// Whether the primary series is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_round_trip() {
        for report in ReportType::ALL {
            assert_eq!(ReportType::from_key(report.as_key()).unwrap(), report);
        }
    }

    #[test]
    fn test_from_key_rejects_unknown() {
        let err = ReportType::from_key("weekly_totals").unwrap_err();
        assert!(err.to_string().contains("weekly_totals"));
    }

    #[test]
    fn test_catalog_has_eight_entries() {
        assert_eq!(ReportType::ALL.len(), 8);
        for report in ReportType::ALL {
            let info = report.info();
            assert!(!info.title.is_empty());
            assert!(!info.chart_renderings.is_empty());
        }
    }

    #[test]
    fn test_time_range_support_flags() {
        assert!(ReportType::RealtimeDonations.info().supports_time_range);
        assert!(!ReportType::LapsedDonors.info().supports_time_range);
        assert!(!ReportType::DonorRetention.info().supports_time_range);
        assert!(!ReportType::CampaignProgress.info().supports_time_range);
    }

    #[test]
    fn test_dataset_serde_round_trip() {
        let dataset = ReportDataset::DonorRetention(vec![RetentionYear {
            year: 2023,
            new_donors: 2,
            retained_donors: 1,
            retention_rate: 50.0,
        }]);

        let json = serde_json::to_string(&dataset).unwrap();
        assert!(json.contains("\"report\":\"donor_retention\""));

        let back: ReportDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dataset);
        assert_eq!(back.report_type(), ReportType::DonorRetention);
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_empty_dataset_is_valid() {
        let dataset = ReportDataset::LapsedDonors(Vec::new());
        assert!(dataset.is_empty());
        let json = serde_json::to_string(&dataset).unwrap();
        let back: ReportDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dataset);
    }
}
