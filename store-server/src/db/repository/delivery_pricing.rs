//! Delivery Pricing Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{
    DEFAULT_COMMISSION_PERCENTAGE, DeliveryPricingRule, DeliveryPricingRuleCreate,
    DeliveryPricingRuleUpdate,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "delivery_pricing";

#[derive(Clone)]
pub struct DeliveryPricingRepository {
    base: BaseRepository,
}

impl DeliveryPricingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All rules, tightest tier first
    pub async fn find_all(&self) -> RepoResult<Vec<DeliveryPricingRule>> {
        let rules: Vec<DeliveryPricingRule> = self
            .base
            .db()
            .query("SELECT * FROM delivery_pricing ORDER BY max_distance_km ASC")
            .await?
            .take(0)?;
        Ok(rules)
    }

    /// Active rules sorted ascending by tier bound — resolver matching order
    pub async fn find_active(&self) -> RepoResult<Vec<DeliveryPricingRule>> {
        let rules: Vec<DeliveryPricingRule> = self
            .base
            .db()
            .query(
                "SELECT * FROM delivery_pricing WHERE is_active = true ORDER BY max_distance_km ASC",
            )
            .await?
            .take(0)?;
        Ok(rules)
    }

    /// Find rule by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DeliveryPricingRule>> {
        let record_id = parse_record_id(TABLE, id)?;
        let rule: Option<DeliveryPricingRule> = self.base.db().select(record_id).await?;
        Ok(rule)
    }

    /// Find rule by exact tier bound, regardless of active flag
    pub async fn find_by_max_distance(&self, km: f64) -> RepoResult<Option<DeliveryPricingRule>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM delivery_pricing WHERE max_distance_km = $km LIMIT 1")
            .bind(("km", km))
            .await?;
        let rules: Vec<DeliveryPricingRule> = result.take(0)?;
        Ok(rules.into_iter().next())
    }

    /// Create a new pricing rule
    ///
    /// Rejects a duplicate `max_distance_km` even against inactive rules so
    /// tiers can never become ambiguous.
    pub async fn create(&self, data: DeliveryPricingRuleCreate) -> RepoResult<DeliveryPricingRule> {
        if self.find_by_max_distance(data.max_distance_km).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Pricing tier for {} km already exists",
                data.max_distance_km
            )));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let rule = DeliveryPricingRule {
            id: None,
            max_distance_km: data.max_distance_km,
            price: data.price,
            agent_commission_percentage: data
                .agent_commission_percentage
                .unwrap_or(DEFAULT_COMMISSION_PERCENTAGE),
            is_active: data.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created: Option<DeliveryPricingRule> =
            self.base.db().create(TABLE).content(rule).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create pricing rule".to_string()))
    }

    /// Update a pricing rule
    pub async fn update(
        &self,
        id: &str,
        data: DeliveryPricingRuleUpdate,
    ) -> RepoResult<DeliveryPricingRule> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Pricing rule {} not found", id)))?;

        // Check duplicate tier if changing the bound
        if let Some(new_km) = data.max_distance_km
            && new_km != existing.max_distance_km
            && self.find_by_max_distance(new_km).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Pricing tier for {} km already exists",
                new_km
            )));
        }

        let record_id = parse_record_id(TABLE, id)?;
        let now = chrono::Utc::now().timestamp_millis();
        let mut merge = serde_json::to_value(&data)
            .map_err(|e| RepoError::Validation(format!("Invalid pricing rule payload: {e}")))?;
        merge["updated_at"] = serde_json::json!(now);
        self.base
            .db()
            .query("UPDATE $rule MERGE $data")
            .bind(("rule", record_id))
            .bind(("data", merge))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Pricing rule {} not found", id)))
    }

    /// Hard delete a pricing rule
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let existing = self.find_by_id(id).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("Pricing rule {} not found", id)));
        }
        let record_id = parse_record_id(TABLE, id)?;
        let _: Option<DeliveryPricingRule> = self.base.db().delete(record_id).await?;
        Ok(true)
    }
}
