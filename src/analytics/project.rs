//! Chart projection: raw usage rows in, render-ready series out.
//!
//! The projection mirrors what the dashboard charts consume directly: a
//! category breakdown (model share of calls), a stacked timeline (quota per
//! time bucket and model), running totals, and a per-model color map. It is
//! a pure function; `now` enters as an argument so the same input always
//! yields the same output.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::colors::model_color;
use super::quota::format_quota;
use super::{Granularity, UNKNOWN_MODEL};
use crate::api_types::UsageRecord;
use crate::config::ChartConfig;

/// One slice of the category (pie) chart: a model and its share of calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    #[serde(rename = "type")]
    pub model: String,
    pub value: f64,
}

/// One row of the stacked timeline. Field names match what the chart
/// binds to; `time_sum` repeats the bucket total on every row of that
/// bucket for tooltip and legend use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "rawQuota")]
    pub raw_quota: f64,
    #[serde(rename = "Usage")]
    pub usage: String,
    #[serde(rename = "TimeSum")]
    pub time_sum: f64,
}

/// Running totals over the whole queried window, independent of grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageTotals {
    pub quota: f64,
    pub count: f64,
    pub tokens: f64,
}

impl UsageTotals {
    /// Average requests per minute over a window of `window_secs` seconds.
    /// Windows shorter than a minute are treated as one minute.
    pub fn average_rpm(&self, window_secs: i64) -> f64 {
        self.count / window_minutes(window_secs)
    }

    /// Average tokens per minute over a window of `window_secs` seconds.
    pub fn average_tpm(&self, window_secs: i64) -> f64 {
        self.tokens / window_minutes(window_secs)
    }
}

fn window_minutes(window_secs: i64) -> f64 {
    (window_secs as f64 / 60.0).max(1.0)
}

/// Everything the dashboard charts render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageProjection {
    pub category: Vec<CategorySlice>,
    pub timeline: Vec<TimeSeriesRow>,
    pub totals: UsageTotals,
    /// Model name → chart color, stable per name.
    pub colors: HashMap<String, String>,
}

#[derive(Clone, Copy, Default)]
struct CellSums {
    quota: f64,
    count: f64,
}

/// Project usage rows into chart series.
///
/// Records are summed per `(bucket, model)` cell; a model and time bucket
/// may appear in any number of input rows. Non-finite numeric fields are
/// treated as zero, so totals never pick up a `NaN`. Empty input projects
/// as a single zero-valued record anchored at `now`, so the charts render
/// an empty-but-valid state instead of failing.
pub fn project(
    records: &[UsageRecord],
    granularity: Granularity,
    now: DateTime<Utc>,
    chart: &ChartConfig,
) -> UsageProjection {
    let synthetic;
    let records = if records.is_empty() {
        synthetic = [UsageRecord {
            created_at: now.timestamp(),
            ..UsageRecord::default()
        }];
        &synthetic[..]
    } else {
        records
    };

    let mut totals = UsageTotals::default();
    let mut models: BTreeSet<String> = BTreeSet::new();
    let mut cells: BTreeMap<String, BTreeMap<String, CellSums>> =
        BTreeMap::new();
    let mut latest = i64::MIN;

    for record in records {
        let record = record.normalized();
        totals.quota += record.quota;
        totals.count += record.count;
        totals.tokens += record.token_used;
        latest = latest.max(record.created_at);

        let model = if record.model_name.is_empty() {
            UNKNOWN_MODEL.to_string()
        } else {
            record.model_name.clone()
        };
        models.insert(model.clone());

        let cell = cells
            .entry(granularity.bucket_key(record.created_at))
            .or_default()
            .entry(model)
            .or_default();
        cell.quota += record.quota;
        cell.count += record.count;
    }

    // Category breakdown: calls per model, largest first, names break ties.
    let mut per_model_count: BTreeMap<&str, f64> = BTreeMap::new();
    for bucket in cells.values() {
        for (model, cell) in bucket {
            *per_model_count.entry(model).or_default() += cell.count;
        }
    }
    let mut category: Vec<CategorySlice> = per_model_count
        .into_iter()
        .map(|(model, value)| CategorySlice {
            model: model.to_string(),
            value,
        })
        .collect();
    category.sort_by(|a, b| {
        b.value.total_cmp(&a.value).then_with(|| a.model.cmp(&b.model))
    });

    // Time buckets present in the data; when the data spans too few, the
    // axis is backfilled with evenly spaced buckets ending at the latest
    // observed timestamp.
    let mut buckets: Vec<String> = cells.keys().cloned().collect();
    if buckets.len() < chart.min_time_points {
        let interval = granularity.interval_secs();
        let n = chart.min_time_points;
        buckets = (0..n)
            .map(|i| {
                granularity.bucket_key(latest - ((n - 1 - i) as i64) * interval)
            })
            .collect();
    }

    // One row per bucket and model; models absent from a bucket get an
    // explicit zero so stacks always carry every series.
    let mut timeline: Vec<TimeSeriesRow> =
        Vec::with_capacity(buckets.len() * models.len());
    for bucket in &buckets {
        let mut rows: Vec<TimeSeriesRow> = models
            .iter()
            .map(|model| {
                let cell = cells
                    .get(bucket)
                    .and_then(|by_model| by_model.get(model))
                    .copied()
                    .unwrap_or_default();
                TimeSeriesRow {
                    time: bucket.clone(),
                    model: model.clone(),
                    raw_quota: cell.quota,
                    usage: if cell.quota != 0.0 {
                        format_quota(cell.quota, 4)
                    } else {
                        "0".to_string()
                    },
                    time_sum: 0.0,
                }
            })
            .collect();

        let sum: f64 = rows.iter().map(|row| row.raw_quota).sum();
        for row in &mut rows {
            row.time_sum = sum;
        }
        // Largest consumer first, so it renders bottom-most in the stack.
        rows.sort_by(|a, b| {
            b.raw_quota
                .total_cmp(&a.raw_quota)
                .then_with(|| a.model.cmp(&b.model))
        });
        timeline.extend(rows);
    }
    // Chronological order; the sort is stable so per-bucket order holds.
    timeline.sort_by(|a, b| a.time.cmp(&b.time));

    let colors = models
        .iter()
        .map(|model| (model.clone(), model_color(model)))
        .collect();

    UsageProjection {
        category,
        timeline,
        totals,
        colors,
    }
}
