//! Delivery Price Resolver
//!
//! Tier matching: among active rules, the smallest `max_distance_km` that
//! still covers the queried distance wins. Tiers are nested by the
//! duplicate-bound constraint, so selection is unambiguous.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::commission::{commission_split, to_decimal, to_f64};
use crate::db::models::DeliveryPricingRule;
use crate::db::repository::DeliveryPricingRepository;
use crate::utils::validation::validate_distance;
use crate::utils::{AppError, AppResult};

/// Resolved price for a delivery distance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub distance: f64,
    pub base_price: f64,
    pub agent_commission: f64,
    pub company_revenue: f64,
    pub applicable_rule: DeliveryPricingRule,
}

/// Select the tightest active tier covering `distance`
pub fn select_tier(rules: &[DeliveryPricingRule], distance: f64) -> Option<&DeliveryPricingRule> {
    rules
        .iter()
        .filter(|r| r.is_active && r.max_distance_km >= distance)
        .min_by(|a, b| {
            a.max_distance_km
                .partial_cmp(&b.max_distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[derive(Clone)]
pub struct PricingResolver {
    rules: DeliveryPricingRepository,
}

impl PricingResolver {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            rules: DeliveryPricingRepository::new(db),
        }
    }

    /// Resolve the delivery price and commission split for a distance
    pub async fn resolve(&self, distance: f64) -> AppResult<PriceQuote> {
        validate_distance(distance)?;

        let rules = self.rules.find_active().await?;
        let rule = select_tier(&rules, distance).ok_or_else(|| {
            AppError::not_found(format!(
                "No active delivery pricing rule covers {} km",
                distance
            ))
        })?;

        let (commission, revenue) =
            commission_split(to_decimal(rule.price), rule.agent_commission_percentage);

        Ok(PriceQuote {
            distance,
            base_price: rule.price,
            agent_commission: to_f64(commission),
            company_revenue: to_f64(revenue),
            applicable_rule: rule.clone(),
        })
    }
}
