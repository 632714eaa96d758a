//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderListFilter, OrderStatus};
use crate::db::repository::OrderRepository;
use crate::orders::{
    AssignmentOutcome, BulkAssignOutcome, BulkUnassignOutcome, DeliverySettlement,
    EarningsCalculator, OrderLifecycle, UnassignmentOutcome,
};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_distance, validate_fee,
    validate_optional_text, validate_percentage, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// 解析状态字符串 (大小写不敏感)
pub(super) fn parse_status(status: &str) -> AppResult<OrderStatus> {
    let parsed = match status.to_uppercase().as_str() {
        "PENDING" => OrderStatus::Pending,
        "PROCESSING" => OrderStatus::Processing,
        "SHIPPED" => OrderStatus::Shipped,
        "OUT_FOR_DELIVERY" => OrderStatus::OutForDelivery,
        "DELIVERED" => OrderStatus::Delivered,
        "CANCELLED" => OrderStatus::Cancelled,
        "RETURNED" => OrderStatus::Returned,
        "NOT_DELIVERED" => OrderStatus::NotDelivered,
        _ => return Err(AppError::validation(format!("Invalid status: {}", status))),
    };
    Ok(parsed)
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub agent: Option<String>,
    pub urgent: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/orders - 订单列表 (状态/配送员/加急过滤 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let assigned_agent_id = query
        .agent
        .as_deref()
        .map(|a| {
            a.parse::<surrealdb::RecordId>()
                .map_err(|_| AppError::validation(format!("Invalid agent id: {}", a)))
        })
        .transpose()?;

    let repo = OrderRepository::new(state.db.clone());
    let orders = repo
        .find_all(OrderListFilter {
            status,
            assigned_agent_id,
            urgent: query.urgent,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - 获取单个订单 (外部单号或记录 ID)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .resolve(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}

/// POST /api/orders - 创建订单 (Pending + 初始时间线)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    if !payload.total.is_finite() || payload.total < 0.0 {
        return Err(AppError::validation(format!(
            "total must be a non-negative number, got {}",
            payload.total
        )));
    }
    validate_optional_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;

    let repo = OrderRepository::new(state.db.clone());
    let order = repo.create(payload).await?;

    tracing::info!(order_id = %order.order_id, "Order created");
    Ok(Json(order))
}

/// Update status request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    pub note: Option<String>,
    pub updated_by: String,
}

/// PUT /api/orders/{id}/status - 更新订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let status = parse_status(&payload.status)?;
    validate_required_text(&payload.updated_by, "updatedBy", MAX_NAME_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let engine = OrderLifecycle::new(state.db.clone());
    let order = engine
        .update_status(&id, status, payload.note, &payload.updated_by)
        .await?;
    Ok(Json(order))
}

/// Assign agent request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignAgentRequest {
    pub order_id: String,
    pub agent_id: String,
    pub assigned_by: String,
}

/// POST /api/orders/assign-agent - 指派配送员
pub async fn assign_agent(
    State(state): State<ServerState>,
    Json(payload): Json<AssignAgentRequest>,
) -> AppResult<Json<AssignmentOutcome>> {
    validate_required_text(&payload.order_id, "orderId", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.agent_id, "agentId", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.assigned_by, "assignedBy", MAX_NAME_LEN)?;

    let engine = OrderLifecycle::new(state.db.clone());
    let outcome = engine
        .assign_agent(&payload.order_id, &payload.agent_id, &payload.assigned_by)
        .await?;
    Ok(Json(outcome))
}

/// Bulk assign request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignRequest {
    pub order_ids: Vec<String>,
    pub agent_id: String,
    pub assigned_by: String,
}

/// PUT /api/orders/bulk-assign - 批量指派 (all-or-nothing)
pub async fn bulk_assign(
    State(state): State<ServerState>,
    Json(payload): Json<BulkAssignRequest>,
) -> AppResult<Json<BulkAssignOutcome>> {
    validate_required_text(&payload.agent_id, "agentId", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.assigned_by, "assignedBy", MAX_NAME_LEN)?;

    let engine = OrderLifecycle::new(state.db.clone());
    let outcome = engine
        .bulk_assign(&payload.order_ids, &payload.agent_id, &payload.assigned_by)
        .await?;
    Ok(Json(outcome))
}

/// Unassign request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignAgentRequest {
    pub order_id: String,
    pub reason: String,
    pub unassigned_by: String,
}

/// POST /api/orders/unassign-agent - 取消指派
pub async fn unassign_agent(
    State(state): State<ServerState>,
    Json(payload): Json<UnassignAgentRequest>,
) -> AppResult<Json<UnassignmentOutcome>> {
    validate_required_text(&payload.order_id, "orderId", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    validate_required_text(&payload.unassigned_by, "unassignedBy", MAX_NAME_LEN)?;

    let engine = OrderLifecycle::new(state.db.clone());
    let outcome = engine
        .unassign_agent(&payload.order_id, &payload.reason, &payload.unassigned_by)
        .await?;
    Ok(Json(outcome))
}

/// Bulk unassign request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUnassignRequest {
    pub order_ids: Vec<String>,
    pub reason: String,
    pub unassigned_by: String,
}

/// PUT /api/orders/bulk-unassign - 批量取消指派 (best-effort)
pub async fn bulk_unassign(
    State(state): State<ServerState>,
    Json(payload): Json<BulkUnassignRequest>,
) -> AppResult<Json<BulkUnassignOutcome>> {
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    validate_required_text(&payload.unassigned_by, "unassignedBy", MAX_NAME_LEN)?;

    let engine = OrderLifecycle::new(state.db.clone());
    let outcome = engine
        .bulk_unassign(&payload.order_ids, &payload.reason, &payload.unassigned_by)
        .await?;
    Ok(Json(outcome))
}

/// Record delivery request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeliveryRequest {
    pub order_id: String,
    pub agent_id: String,
    pub distance: f64,
    pub delivery_fee: f64,
    pub agent_commission_percentage: Option<u32>,
}

/// POST /api/orders/record-delivery - 记录妥投并结算分成
pub async fn record_delivery(
    State(state): State<ServerState>,
    Json(payload): Json<RecordDeliveryRequest>,
) -> AppResult<Json<DeliverySettlement>> {
    validate_required_text(&payload.order_id, "orderId", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.agent_id, "agentId", MAX_SHORT_TEXT_LEN)?;
    validate_distance(payload.distance)?;
    validate_fee(payload.delivery_fee)?;
    if let Some(pct) = payload.agent_commission_percentage {
        validate_percentage(pct)?;
    }

    let calculator = EarningsCalculator::new(state.db.clone());
    let settlement = calculator
        .record_delivery_completion(
            &payload.order_id,
            &payload.agent_id,
            payload.distance,
            payload.delivery_fee,
            payload.agent_commission_percentage,
        )
        .await?;
    Ok(Json(settlement))
}
