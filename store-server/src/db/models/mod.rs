//! Database Models
//!
//! Document shapes stored in SurrealDB tables `order`, `agent` and
//! `delivery_pricing`. All timestamps are Unix millis (`i64`); money fields
//! are `f64` at rest and `Decimal` in computation.

pub mod agent;
pub mod delivery_pricing;
pub mod order;
pub mod serde_helpers;

pub use agent::{
    AccountStanding, Agent, AgentCreate, AgentListFilter, AgentPerformance, AgentUpdate,
    WorkCapacity,
};
pub use delivery_pricing::{
    DEFAULT_COMMISSION_PERCENTAGE, DeliveryPricingRule, DeliveryPricingRuleCreate,
    DeliveryPricingRuleUpdate,
};
pub use order::{
    DeliveryInfo, DeliveryType, Order, OrderCreate, OrderListFilter, OrderStatus, OrderTotals,
    TimelineAction, TimelineEntry,
};
