//! Marketplace price arithmetic.
//!
//! Prices shown in the model marketplace derive from three multipliers:
//! the model's own ratio, its completion (output) ratio, and the selected
//! group's ratio. All arithmetic runs on [`Decimal`] — money never touches
//! `f64` beyond the wire format it arrives in.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, dec};
use serde::Serialize;

use crate::api_types::pricing::QUOTA_TYPE_FIXED;
use crate::api_types::{ModelPricing, PricingResponse};
use crate::catalog::{self, Vendor};

/// How a model bills under a selected group ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "billing", rename_all = "snake_case")]
pub enum ModelPrice {
    /// Dollars per million tokens, input and output separately.
    PerToken { input: Decimal, output: Decimal },
    /// Flat dollars per call, tokens not counted.
    PerCall { amount: Decimal },
}

/// One marketplace listing row.
#[derive(Debug, Clone, Serialize)]
pub struct PriceRow {
    pub model_name: String,
    pub vendor: Vendor,
    pub price: ModelPrice,
    /// Whether the selected group may use this model.
    pub available: bool,
}

fn decimal_or(value: f64, fallback: Decimal) -> Decimal {
    Decimal::from_f64(value).unwrap_or(fallback)
}

/// Price of one model under a group ratio.
///
/// Ratio-billed models charge `model_ratio × 2 × group_ratio` dollars per
/// million input tokens and that times `completion_ratio` for output.
/// Fixed-price models charge `model_price × group_ratio` per call.
pub fn model_price(pricing: &ModelPricing, group_ratio: f64) -> ModelPrice {
    let ratio = decimal_or(group_ratio, Decimal::ONE);
    if pricing.quota_type == QUOTA_TYPE_FIXED {
        return ModelPrice::PerCall {
            amount: decimal_or(pricing.model_price, Decimal::ZERO) * ratio,
        };
    }
    let input = decimal_or(pricing.model_ratio, Decimal::ZERO) * dec!(2) * ratio;
    let output = input * decimal_or(pricing.completion_ratio, Decimal::ONE);
    ModelPrice::PerToken { input, output }
}

/// Ratio the backend applies for a group; absent groups price at 1.
pub fn group_ratio(response: &PricingResponse, group: &str) -> f64 {
    response.group_ratio.get(group).copied().unwrap_or(1.0)
}

/// Groups the current user may price against, name-sorted.
pub fn selectable_groups(response: &PricingResponse) -> Vec<String> {
    let mut groups: Vec<String> =
        response.usable_group.keys().cloned().collect();
    groups.sort();
    groups
}

/// The full marketplace listing for one selected group, name-sorted.
/// Models restricted to other groups still appear, marked unavailable.
pub fn price_rows(response: &PricingResponse, group: &str) -> Vec<PriceRow> {
    let ratio = group_ratio(response, group);
    let mut rows: Vec<PriceRow> = response
        .data
        .iter()
        .map(|pricing| PriceRow {
            model_name: pricing.model_name.clone(),
            vendor: catalog::classify(&pricing.model_name),
            price: model_price(pricing, ratio),
            available: pricing.enable_groups.is_empty()
                || pricing.enable_groups.iter().any(|g| g == group),
        })
        .collect();
    rows.sort_by(|a, b| a.model_name.cmp(&b.model_name));
    rows
}
