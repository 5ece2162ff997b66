//! Quota display arithmetic.
//!
//! The backend accounts usage in integer quota units; the console displays
//! dollars. Conversion goes through [`rust_decimal`] so displayed amounts
//! round decimally, never through binary-float string formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::FromPrimitive;

/// Quota units per dollar.
pub const QUOTA_PER_UNIT: i64 = 500_000;

/// Convert a raw quota value to a dollar amount rounded to `dp` decimal
/// places, half away from zero. Non-finite input converts to zero.
pub fn quota_to_amount(quota: f64, dp: u32) -> Decimal {
    let quota = Decimal::from_f64(quota).unwrap_or_default();
    (quota / Decimal::from(QUOTA_PER_UNIT))
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a quota value as a dollar string with exactly `dp` decimal
/// places, e.g. `$1.25`.
pub fn format_quota(quota: f64, dp: u32) -> String {
    format!("${:.prec$}", quota_to_amount(quota, dp), prec = dp as usize)
}
