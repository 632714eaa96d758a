//! Delivery Pricing API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{
    DeliveryPricingRule, DeliveryPricingRuleCreate, DeliveryPricingRuleUpdate,
};
use crate::db::repository::DeliveryPricingRepository;
use crate::pricing::PricingResolver;
use crate::utils::validation::{validate_distance, validate_fee, validate_percentage};
use crate::utils::{AppError, AppResult};

/// Query params for the collection route
///
/// `?distance=&calculate=true` turns the listing into a price quote.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub distance: Option<f64>,
    pub calculate: Option<bool>,
}

/// GET /api/delivery-pricing - 规则列表 / 价格试算
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    if query.calculate.unwrap_or(false) {
        let distance = query.distance.ok_or_else(|| {
            AppError::validation("distance is required when calculate=true")
        })?;
        let resolver = PricingResolver::new(state.db.clone());
        let quote = resolver.resolve(distance).await?;
        return Ok(Json(quote).into_response());
    }

    let repo = DeliveryPricingRepository::new(state.db.clone());
    let rules = repo.find_all().await?;
    Ok(Json(rules).into_response())
}

/// GET /api/delivery-pricing/{id} - 获取单条规则
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeliveryPricingRule>> {
    let repo = DeliveryPricingRepository::new(state.db.clone());
    let rule = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pricing rule {} not found", id)))?;
    Ok(Json(rule))
}

/// POST /api/delivery-pricing - 创建规则
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DeliveryPricingRuleCreate>,
) -> AppResult<Json<DeliveryPricingRule>> {
    validate_distance(payload.max_distance_km)?;
    if payload.max_distance_km <= 0.0 {
        return Err(AppError::validation(
            "max_distance_km must be greater than zero",
        ));
    }
    validate_fee(payload.price)?;
    if let Some(pct) = payload.agent_commission_percentage {
        validate_percentage(pct)?;
    }

    let repo = DeliveryPricingRepository::new(state.db.clone());
    let rule = repo.create(payload).await?;

    tracing::info!(
        max_distance_km = rule.max_distance_km,
        price = rule.price,
        "Pricing rule created"
    );
    Ok(Json(rule))
}

/// PUT /api/delivery-pricing/{id} - 更新规则
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DeliveryPricingRuleUpdate>,
) -> AppResult<Json<DeliveryPricingRule>> {
    if let Some(km) = payload.max_distance_km {
        validate_distance(km)?;
        if km <= 0.0 {
            return Err(AppError::validation(
                "max_distance_km must be greater than zero",
            ));
        }
    }
    if let Some(price) = payload.price {
        validate_fee(price)?;
    }
    if let Some(pct) = payload.agent_commission_percentage {
        validate_percentage(pct)?;
    }

    let repo = DeliveryPricingRepository::new(state.db.clone());
    let rule = repo.update(&id, payload).await?;
    Ok(Json(rule))
}

/// DELETE /api/delivery-pricing/{id} - 删除规则
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DeliveryPricingRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(Json(result))
}
