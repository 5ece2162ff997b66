//! Usage analytics: time bucketing, chart projection, colors, quota display.
//!
//! The dashboard feeds raw [`UsageRecord`](crate::api_types::UsageRecord)
//! rows through [`project`] to obtain everything its charts render: a
//! category breakdown, a stacked timeline, and running totals. The
//! projection is a pure function of its inputs; time enters only as an
//! explicit argument.

mod colors;
mod dashboard;
mod project;
mod quota;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

pub use colors::model_color;
pub use dashboard::{DashboardService, DashboardView};
pub use project::{
    CategorySlice, TimeSeriesRow, UsageProjection, UsageTotals, project,
};
pub use quota::{QUOTA_PER_UNIT, format_quota, quota_to_amount};

/// Placeholder model name for records with an empty or missing one.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Time-bucket width used to group usage records for charting.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Hour,
    Day,
    Week,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
        }
    }

    /// Width of one bucket, in seconds.
    pub fn interval_secs(&self) -> i64 {
        match self {
            Granularity::Hour => 3_600,
            Granularity::Day => 86_400,
            Granularity::Week => 604_800,
        }
    }

    /// Bucket key for a unix timestamp, in UTC.
    ///
    /// The same timestamp under the same granularity always maps to the
    /// same key, and all three formats sort lexicographically in
    /// chronological order, so the timeline's final ordering is a plain
    /// string sort.
    pub fn bucket_key(&self, created_at: i64) -> String {
        let ts = DateTime::<Utc>::from_timestamp(created_at, 0)
            .unwrap_or(DateTime::UNIX_EPOCH);
        match self {
            Granularity::Hour => ts.format("%Y-%m-%d %H:00").to_string(),
            Granularity::Day => ts.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let week = ts.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            other => Err(format!("unknown granularity: {other}")),
        }
    }
}
