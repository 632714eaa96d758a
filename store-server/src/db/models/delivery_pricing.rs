//! Delivery Pricing Rule Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Default agent share of a delivery fee
pub const DEFAULT_COMMISSION_PERCENTAGE: u32 = 70;

/// Distance-tier pricing rule (配送距离阶梯计价)
///
/// Tiers are nested: a distance matches the rule with the smallest
/// `max_distance_km` that still covers it. At most one rule may exist per
/// distinct `max_distance_km`, enforced at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPricingRule {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Upper bound of this tier in km
    pub max_distance_km: f64,
    /// Flat delivery fee for the tier
    pub price: f64,
    #[serde(default = "default_commission")]
    pub agent_commission_percentage: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

fn default_commission() -> u32 {
    DEFAULT_COMMISSION_PERCENTAGE
}

/// Create pricing rule payload
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryPricingRuleCreate {
    pub max_distance_km: f64,
    pub price: f64,
    pub agent_commission_percentage: Option<u32>,
    pub is_active: Option<bool>,
}

/// Update pricing rule payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPricingRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_commission_percentage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
