use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::user::GroupInfo;

/// How a model is billed.
pub const QUOTA_TYPE_RATIO: u8 = 0;
pub const QUOTA_TYPE_FIXED: u8 = 1;

/// Per-model pricing entry from `GET /api/pricing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    pub model_name: String,
    /// 0 = billed by token ratio, 1 = fixed price per call.
    #[serde(default)]
    pub quota_type: u8,
    /// Input-token multiplier relative to the base rate.
    #[serde(default)]
    pub model_ratio: f64,
    /// Output-token multiplier relative to the input rate.
    #[serde(default = "default_completion_ratio")]
    pub completion_ratio: f64,
    /// Dollars per call for fixed-price models.
    #[serde(default)]
    pub model_price: f64,
    /// Groups this model is enabled for; empty means all.
    #[serde(default)]
    pub enable_groups: Vec<String>,
}

fn default_completion_ratio() -> f64 {
    1.0
}

/// Response of `GET /api/pricing`. Unlike the other endpoints this one is
/// flat rather than `{success, message, data}`-enveloped, with the group
/// ratio tables alongside the model list.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Vec<ModelPricing>,
    /// Multiplier applied per group on top of the model rate.
    #[serde(default)]
    pub group_ratio: HashMap<String, f64>,
    /// Groups the current user may select.
    #[serde(default)]
    pub usable_group: HashMap<String, GroupInfo>,
}
