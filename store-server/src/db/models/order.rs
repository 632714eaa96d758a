//! Order Model
//!
//! 订单主文档：状态、配送信息、时间线、配送员弱引用。
//! 时间线只追加，顺序有业务意义，禁止重排或裁剪。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

// =============================================================================
// Order (主表)
// =============================================================================

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
    NotDelivered,
}

impl OrderStatus {
    /// Terminal statuses accept no further business transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered
                | OrderStatus::Cancelled
                | OrderStatus::Returned
                | OrderStatus::NotDelivered
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::NotDelivered => "NOT_DELIVERED",
        };
        write!(f, "{}", s)
    }
}

/// Delivery fulfilment type
///
/// `Own` orders are fulfilled by in-house agents and are the only ones
/// eligible for agent assignment. `Shiprocket` orders go to the third-party
/// courier integration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Own,
    Shiprocket,
}

/// Delivery block embedded in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryInfo {
    #[serde(rename = "type")]
    pub delivery_type: DeliveryType,
    /// Delivery fee charged for this order
    pub fee: Option<f64>,
    /// Delivery distance in km
    pub distance: Option<f64>,
    /// Agent share of the fee, settled at completion
    pub agent_commission: Option<f64>,
    /// Company share of the fee (fee - agent_commission, exact remainder)
    pub company_revenue: Option<f64>,
    pub agent_commission_percentage: Option<u32>,
    /// Unix millis when delivery was completed
    pub completed_at: Option<i64>,
}

impl DeliveryInfo {
    pub fn own() -> Self {
        Self {
            delivery_type: DeliveryType::Own,
            fee: None,
            distance: None,
            agent_commission: None,
            company_revenue: None,
            agent_commission_percentage: None,
            completed_at: None,
        }
    }

    pub fn shiprocket() -> Self {
        Self {
            delivery_type: DeliveryType::Shiprocket,
            ..Self::own()
        }
    }
}

/// Order totals block
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderTotals {
    pub total: f64,
}

// =============================================================================
// Timeline (append-only audit log)
// =============================================================================

/// Timeline action types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimelineAction {
    OrderCreated,
    StatusChanged,
    AgentAssigned,
    AgentUnassigned,
    DeliveryCompleted,
}

/// One timeline entry; insertion order is meaningful and never changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Unix millis
    pub ts: i64,
    /// Operator (admin id/name or "system")
    pub actor: String,
    pub action: TimelineAction,
    pub note: Option<String>,
}

impl TimelineEntry {
    pub fn new(
        ts: i64,
        actor: impl Into<String>,
        action: TimelineAction,
        note: Option<String>,
    ) -> Self {
        Self {
            ts,
            actor: actor.into(),
            action,
            note,
        }
    }
}

// =============================================================================
// Order entity
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Externally visible order number (e.g. "MP202608071001")
    pub order_id: String,
    pub status: OrderStatus,
    pub delivery: DeliveryInfo,
    /// Weak reference to the assigned agent; None when unassigned
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub assigned_agent_id: Option<RecordId>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub totals: OrderTotals,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Unix millis
    pub created_at: i64,
    /// Refreshed on every mutation
    pub updated_at: i64,
    pub assigned_at: Option<i64>,
    pub unassigned_at: Option<i64>,
    pub unassigned_reason: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub delivery_type: DeliveryType,
    pub total: f64,
    #[serde(default)]
    pub urgent: bool,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_by: Option<String>,
}

/// Filters for listing orders
#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    pub assigned_agent_id: Option<RecordId>,
    pub urgent: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}
