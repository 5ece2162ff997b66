use serde::{Deserialize, Serialize};

/// One row of the usage endpoints (`/api/data/`, `/api/data/self/`).
///
/// Rows are *not* unique per model and time bucket; aggregation must sum.
/// Numeric fields arrive as loosely typed JSON numbers and may be missing;
/// [`normalized`](Self::normalized) coerces anything non-finite to zero so
/// `NaN` never propagates into chart sums.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub quota: f64,
    #[serde(default)]
    pub count: f64,
    #[serde(default)]
    pub token_used: f64,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: i64,
}

impl UsageRecord {
    /// Copy of the record with all numeric fields coerced to finite values.
    pub fn normalized(&self) -> UsageRecord {
        UsageRecord {
            model_name: self.model_name.clone(),
            quota: finite_or_zero(self.quota),
            count: finite_or_zero(self.count),
            token_used: finite_or_zero(self.token_used),
            created_at: self.created_at,
        }
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Query parameters for the usage endpoints.
#[derive(Debug, Clone, Default)]
pub struct UsageQuery {
    /// Admin-only filter; empty queries all users.
    pub username: String,
    /// Unix seconds, inclusive.
    pub start_timestamp: i64,
    /// Unix seconds, exclusive.
    pub end_timestamp: i64,
}
