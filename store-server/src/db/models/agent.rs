//! Delivery Agent Model
//!
//! 配送员文档。原系统把账号状态和接单状态混在一个 status 字段里，
//! 这里拆成两个轴：`account_standing` (账号) 和 `work_capacity` (接单)。
//! 旧的合并视图只在 API 边界派生，见 [`Agent::legacy_status`]。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Account standing axis: admin-controlled account state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStanding {
    Pending,
    Active,
    Suspended,
    Inactive,
}

/// Work capacity axis: own-delivery load state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkCapacity {
    Available,
    Busy,
}

/// Cumulative performance counters, only mutated by the lifecycle engine
/// and earnings calculator. Monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentPerformance {
    pub orders_assigned: i64,
    pub deliveries_completed: i64,
    pub average_rating: f64,
    pub total_earnings: f64,
}

/// Delivery agent entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub account_standing: AccountStanding,
    pub work_capacity: WorkCapacity,
    /// Gates eligibility for assignment
    #[serde(default)]
    pub approved: bool,
    /// Single-assignment pointer to the current order
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub current_order_id: Option<RecordId>,
    /// Bulk-assignment set; coexists with `current_order_id`
    #[serde(default, with = "serde_helpers::record_id_vec")]
    pub assigned_orders: Vec<RecordId>,
    #[serde(default)]
    pub performance: AgentPerformance,
    pub created_at: i64,
    pub updated_at: i64,
    pub assigned_at: Option<i64>,
}

impl Agent {
    /// Legacy combined status view.
    ///
    /// Account standing wins over work capacity: a suspended agent reads
    /// "suspended" even while holding orders.
    pub fn legacy_status(&self) -> &'static str {
        match self.account_standing {
            AccountStanding::Pending => "pending",
            AccountStanding::Suspended => "suspended",
            AccountStanding::Inactive => "inactive",
            AccountStanding::Active => match self.work_capacity {
                WorkCapacity::Busy => "busy",
                WorkCapacity::Available => "available",
            },
        }
    }
}

/// Create agent payload — agents start pending and unapproved
#[derive(Debug, Clone, Deserialize)]
pub struct AgentCreate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Update agent profile payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Filters for listing agents
#[derive(Debug, Clone, Default)]
pub struct AgentListFilter {
    pub account_standing: Option<AccountStanding>,
    pub work_capacity: Option<WorkCapacity>,
    pub approved: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(standing: AccountStanding, capacity: WorkCapacity) -> Agent {
        Agent {
            id: None,
            name: "A1".to_string(),
            phone: "9000000001".to_string(),
            email: None,
            account_standing: standing,
            work_capacity: capacity,
            approved: true,
            current_order_id: None,
            assigned_orders: vec![],
            performance: AgentPerformance::default(),
            created_at: 0,
            updated_at: 0,
            assigned_at: None,
        }
    }

    #[test]
    fn test_legacy_status_standing_wins() {
        assert_eq!(
            agent(AccountStanding::Suspended, WorkCapacity::Busy).legacy_status(),
            "suspended"
        );
        assert_eq!(
            agent(AccountStanding::Inactive, WorkCapacity::Available).legacy_status(),
            "inactive"
        );
        assert_eq!(
            agent(AccountStanding::Pending, WorkCapacity::Available).legacy_status(),
            "pending"
        );
    }

    #[test]
    fn test_legacy_status_active_derives_capacity() {
        assert_eq!(
            agent(AccountStanding::Active, WorkCapacity::Busy).legacy_status(),
            "busy"
        );
        assert_eq!(
            agent(AccountStanding::Active, WorkCapacity::Available).legacy_status(),
            "available"
        );
    }
}
