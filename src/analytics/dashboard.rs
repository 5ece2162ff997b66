//! Dashboard refresh: fetch a usage window and project it for the charts.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{Granularity, UsageProjection, project};
use crate::api_types::UsageQuery;
use crate::client::GatewayClient;
use crate::config::ChartConfig;
use crate::error::ConsoleResult;

/// One refreshed dashboard: the chart projection plus the stat-tile rate
/// metrics averaged over the queried window.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub projection: UsageProjection,
    pub average_rpm: f64,
    pub average_tpm: f64,
}

/// Loads usage records and turns them into a [`DashboardView`].
pub struct DashboardService {
    client: Arc<GatewayClient>,
    chart: ChartConfig,
}

impl DashboardService {
    pub fn new(client: Arc<GatewayClient>, chart: ChartConfig) -> Self {
        Self { client, chart }
    }

    /// Default query window for a granularity: the last day for hourly
    /// charts, the last month for weekly ones, the last week otherwise.
    /// The end is padded an hour forward so just-written records are
    /// included.
    pub fn default_window(
        granularity: Granularity,
        now: DateTime<Utc>,
    ) -> UsageQuery {
        let now_ts = now.timestamp();
        let span = match granularity {
            Granularity::Hour => 86_400,
            Granularity::Day => 7 * 86_400,
            Granularity::Week => 30 * 86_400,
        };
        UsageQuery {
            username: String::new(),
            start_timestamp: now_ts - span,
            end_timestamp: now_ts + 3_600,
        }
    }

    /// Refresh from the calling user's own records.
    pub async fn refresh(
        &self,
        query: &UsageQuery,
        granularity: Granularity,
    ) -> ConsoleResult<DashboardView> {
        let records = self.client.usage_self(query, granularity).await?;
        Ok(self.view(&records, query, granularity))
    }

    /// Refresh from the admin endpoint, honoring the query's username
    /// filter.
    pub async fn refresh_admin(
        &self,
        query: &UsageQuery,
        granularity: Granularity,
    ) -> ConsoleResult<DashboardView> {
        let records = self.client.usage(query, granularity).await?;
        Ok(self.view(&records, query, granularity))
    }

    fn view(
        &self,
        records: &[crate::api_types::UsageRecord],
        query: &UsageQuery,
        granularity: Granularity,
    ) -> DashboardView {
        let projection =
            project(records, granularity, Utc::now(), &self.chart);
        let window_secs = query.end_timestamp - query.start_timestamp;
        DashboardView {
            average_rpm: projection.totals.average_rpm(window_secs),
            average_tpm: projection.totals.average_tpm(window_secs),
            projection,
        }
    }
}
