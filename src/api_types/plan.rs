use serde::{Deserialize, Serialize};

pub const PLAN_STATUS_DISABLED: i32 = 0;
pub const PLAN_STATUS_ENABLED: i32 = 1;

pub const ORDER_STATUS_ACTIVE: i32 = 1;
pub const ORDER_STATUS_EXPIRED: i32 = 2;

/// A purchasable subscription plan.
///
/// `price` is deducted from the user's pay-as-you-go quota; `total_quota`
/// is granted to the subscription balance. `duration_days == 0` means the
/// granted quota never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub total_quota: i64,
    #[serde(default)]
    pub daily_quota: i64,
    #[serde(default)]
    pub duration_days: i64,
    #[serde(default = "default_status")]
    pub status: i32,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_status() -> i32 {
    PLAN_STATUS_ENABLED
}

impl SubscriptionPlan {
    pub fn is_enabled(&self) -> bool {
        self.status == PLAN_STATUS_ENABLED
    }

    pub fn never_expires(&self) -> bool {
        self.duration_days == 0
    }
}

/// Admin request body for creating a plan.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlan {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub total_quota: i64,
    pub daily_quota: i64,
    pub duration_days: i64,
    pub status: i32,
    pub sort_order: i64,
}

// Updates PUT the full plan back (the backend replaces every field), so
// there is no separate partial-update body; [`SubscriptionPlan`] is the
// upsert shape.

/// A purchase record from `GET /api/plan/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPlanOrder {
    pub id: i64,
    pub plan_id: i64,
    pub plan_name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub granted_quota: i64,
    #[serde(default)]
    pub duration_days: i64,
    /// Unix seconds.
    #[serde(default)]
    pub start_time: i64,
    /// Unix seconds; zero means no expiration.
    #[serde(default)]
    pub expire_time: i64,
    #[serde(default)]
    pub status: i32,
}

impl UserPlanOrder {
    pub fn is_active(&self) -> bool {
        self.status == ORDER_STATUS_ACTIVE
    }
}

/// Paged order listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanOrderPage {
    #[serde(default)]
    pub items: Vec<UserPlanOrder>,
    #[serde(default)]
    pub total: i64,
}
