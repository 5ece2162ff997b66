//! Wire types for the gateway backend's REST API.
//!
//! These mirror the backend's JSON shapes exactly; derived views live in
//! the modules that compute them (`analytics`, `pricing`).

pub mod chat;
pub mod common;
pub mod plan;
pub mod pricing;
pub mod usage;
pub mod user;

pub use chat::{ChatCompletionChunk, ChatCompletionRequest, Message, Role};
pub use common::ApiEnvelope;
pub use plan::{CreatePlan, PlanOrderPage, SubscriptionPlan, UserPlanOrder};
pub use pricing::{ModelPricing, PricingResponse};
pub use usage::{UsageQuery, UsageRecord};
pub use user::{GroupInfo, GroupOption, UserSelf};
