//! Order Lifecycle Engine
//!
//! Orchestrates status transitions and agent assignment. Every operation
//! that touches both an order and an agent commits as ONE SurrealDB
//! transaction, so a reader can never observe "order assigned, agent not
//! yet updated" or the reverse.
//!
//! Assignment re-checks `assigned_agent_id` inside the transaction
//! (compare-and-swap): two concurrent assigns can both pass the engine's
//! precondition read, but only the first commit wins; the second aborts
//! with a conflict.
//!
//! # Bulk policies
//!
//! Bulk operations carry their failure policy explicitly:
//! - bulk assign is [`BulkPolicy::AtomicAll`] — any invalid order aborts
//!   the whole call before anything is written;
//! - bulk unassign is [`BulkPolicy::BestEffort`] — invalid orders are
//!   skipped and reported, the valid remainder commits.

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::error::{BulkItemError, LifecycleError, LifecycleResult, classify_commit_error};
use crate::db::models::{
    AccountStanding, Agent, DeliveryType, Order, OrderStatus, TimelineAction, TimelineEntry,
};
use crate::db::repository::{AgentRepository, OrderRepository, RepoError};
use crate::utils::time::now_millis;
use crate::utils::validation::MAX_BULK_ORDERS;

/// Failure policy of a bulk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPolicy {
    /// Any invalid item aborts the whole call; nothing is written
    AtomicAll,
    /// Invalid items are skipped and reported; valid items commit
    BestEffort,
}

/// Compact agent reference returned from lifecycle operations
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub phone: String,
}

impl From<&Agent> for AgentSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            name: agent.name.clone(),
            phone: agent.phone.clone(),
        }
    }
}

/// Result of a successful single assignment
#[derive(Debug, Serialize)]
pub struct AssignmentOutcome {
    pub order: Order,
    pub agent: AgentSummary,
}

/// Result of a successful bulk assignment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignOutcome {
    pub assigned_orders_count: usize,
    pub assigned_orders: Vec<String>,
    pub agent: AgentSummary,
}

/// Result of a successful unassignment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignmentOutcome {
    pub order: Order,
    pub previous_agent: Option<AgentSummary>,
    pub reason: String,
}

/// Result of a bulk unassignment (best-effort: errors ride along)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUnassignOutcome {
    pub unassigned_orders_count: usize,
    pub unassigned_orders: Vec<String>,
    pub affected_agents: Vec<AgentSummary>,
    pub errors: Vec<BulkItemError>,
}

const ASSIGN_TXN: &str = r#"
BEGIN TRANSACTION;
LET $cur = (SELECT VALUE assigned_agent_id FROM ONLY $ord);
IF $cur != NONE AND $cur != NULL { THROW 'order_already_assigned' };
UPDATE $ord SET
    assigned_agent_id = $agt_ref,
    status = IF status = 'PENDING' THEN 'PROCESSING' ELSE status END,
    timeline += $entry,
    assigned_at = $now,
    updated_at = $now;
UPDATE $agt SET
    work_capacity = 'BUSY',
    current_order_id = $ord_ref,
    assigned_orders += $ord_ref,
    performance.orders_assigned += 1,
    assigned_at = $now,
    updated_at = $now;
COMMIT TRANSACTION;
"#;

const BULK_ASSIGN_TXN: &str = r#"
BEGIN TRANSACTION;
FOR $ord IN $orders {
    LET $cur = (SELECT VALUE assigned_agent_id FROM ONLY $ord);
    IF $cur != NONE AND $cur != NULL { THROW 'order_already_assigned' };
    UPDATE $ord SET
        assigned_agent_id = $agt_ref,
        status = IF status = 'PENDING' THEN 'PROCESSING' ELSE status END,
        timeline += $entry,
        assigned_at = $now,
        updated_at = $now;
};
UPDATE $agt SET
    work_capacity = 'BUSY',
    assigned_orders += $order_refs,
    performance.orders_assigned += $count,
    assigned_at = $now,
    updated_at = $now;
COMMIT TRANSACTION;
"#;

const UNASSIGN_TXN: &str = r#"
BEGIN TRANSACTION;
UPDATE $ord SET
    assigned_agent_id = NONE,
    status = IF status = 'PROCESSING' THEN 'PENDING' ELSE status END,
    timeline += $entry,
    unassigned_at = $now,
    unassigned_reason = $reason,
    updated_at = $now;
UPDATE $agt SET
    work_capacity = IF current_order_id = $ord_ref THEN 'AVAILABLE' ELSE work_capacity END,
    current_order_id = IF current_order_id = $ord_ref THEN NONE ELSE current_order_id END,
    assigned_orders -= $ord_ref,
    updated_at = $now;
COMMIT TRANSACTION;
"#;

const UNASSIGN_ORDER_ONLY_TXN: &str = r#"
UPDATE $ord SET
    assigned_agent_id = NONE,
    status = IF status = 'PROCESSING' THEN 'PENDING' ELSE status END,
    timeline += $entry,
    unassigned_at = $now,
    unassigned_reason = $reason,
    updated_at = $now;
"#;

const BULK_UNASSIGN_TXN: &str = r#"
BEGIN TRANSACTION;
FOR $ord IN $orders {
    UPDATE $ord SET
        assigned_agent_id = NONE,
        status = IF status = 'PROCESSING' THEN 'PENDING' ELSE status END,
        timeline += $entry,
        unassigned_at = $now,
        unassigned_reason = $reason,
        updated_at = $now;
};
FOR $agt IN $agents {
    UPDATE $agt SET
        work_capacity = IF current_order_id IN $order_refs THEN 'AVAILABLE' ELSE work_capacity END,
        current_order_id = IF current_order_id IN $order_refs THEN NONE ELSE current_order_id END,
        assigned_orders -= $order_refs,
        updated_at = $now;
};
COMMIT TRANSACTION;
"#;

/// Order lifecycle engine
#[derive(Clone)]
pub struct OrderLifecycle {
    db: Surreal<Db>,
    orders: OrderRepository,
    agents: AgentRepository,
}

impl OrderLifecycle {
    /// Failure policy of [`Self::bulk_assign`]
    pub const BULK_ASSIGN_POLICY: BulkPolicy = BulkPolicy::AtomicAll;
    /// Failure policy of [`Self::bulk_unassign`]
    pub const BULK_UNASSIGN_POLICY: BulkPolicy = BulkPolicy::BestEffort;

    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            agents: AgentRepository::new(db.clone()),
            db,
        }
    }

    /// Assign an agent to an order.
    ///
    /// Preconditions, first failure wins: order exists; order unassigned;
    /// own-delivery; agent exists; agent approved and not inactive.
    pub async fn assign_agent(
        &self,
        order_id: &str,
        agent_id: &str,
        assigned_by: &str,
    ) -> LifecycleResult<AssignmentOutcome> {
        let order = self
            .orders
            .resolve(order_id)
            .await?
            .ok_or_else(|| LifecycleError::OrderNotFound(order_id.to_string()))?;

        if order.assigned_agent_id.is_some() {
            return Err(LifecycleError::AlreadyAssigned(order.order_id));
        }
        if order.delivery.delivery_type != DeliveryType::Own {
            return Err(LifecycleError::IneligibleDeliveryType(order.order_id));
        }

        let agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LifecycleError::AgentNotFound(agent_id.to_string()))?;

        if !agent.approved || agent.account_standing == AccountStanding::Inactive {
            return Err(LifecycleError::AgentUnavailable(agent_id.to_string()));
        }

        let ord = record_ref(&order.id, "order")?;
        let agt = record_ref(&agent.id, "agent")?;
        let now = now_millis();
        let entry = TimelineEntry::new(
            now,
            assigned_by,
            TimelineAction::AgentAssigned,
            Some(format!("{} assigned", agent.name)),
        );

        self.db
            .query(ASSIGN_TXN)
            .bind(("ord", ord.clone()))
            .bind(("agt", agt.clone()))
            .bind(("ord_ref", ord.to_string()))
            .bind(("agt_ref", agt.to_string()))
            .bind(("entry", entry))
            .bind(("now", now))
            .await
            .and_then(|response| response.check())
            .map_err(|e| classify_commit_error(e, &order.order_id))?;

        tracing::info!(
            order_id = %order.order_id,
            agent = %agt,
            assigned_by = %assigned_by,
            "Agent assigned to order"
        );

        let order = self.read_back_order(&ord).await?;
        let agent = self.read_back_agent(&agt).await?;
        Ok(AssignmentOutcome {
            agent: AgentSummary::from(&agent),
            order,
        })
    }

    /// Assign one agent to a batch of orders ([`BulkPolicy::AtomicAll`]).
    ///
    /// The agent is validated once; every order is validated independently
    /// and ALL must pass before anything is written.
    pub async fn bulk_assign(
        &self,
        order_ids: &[String],
        agent_id: &str,
        assigned_by: &str,
    ) -> LifecycleResult<BulkAssignOutcome> {
        if order_ids.is_empty() {
            return Err(LifecycleError::Validation(
                "orderIds must not be empty".to_string(),
            ));
        }
        if order_ids.len() > MAX_BULK_ORDERS {
            return Err(LifecycleError::Validation(format!(
                "orderIds exceeds maximum bulk size ({MAX_BULK_ORDERS})"
            )));
        }

        let agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LifecycleError::AgentNotFound(agent_id.to_string()))?;
        if !agent.approved || agent.account_standing == AccountStanding::Inactive {
            return Err(LifecycleError::AgentUnavailable(agent_id.to_string()));
        }

        let mut errors: Vec<BulkItemError> = Vec::new();
        let mut targets: Vec<(RecordId, String)> = Vec::new();

        for id in order_ids {
            match self.orders.resolve(id).await? {
                None => errors.push(BulkItemError {
                    order_id: id.clone(),
                    reason: "not found".to_string(),
                }),
                Some(order) if order.assigned_agent_id.is_some() => errors.push(BulkItemError {
                    order_id: order.order_id,
                    reason: "already assigned".to_string(),
                }),
                Some(order) if order.delivery.delivery_type != DeliveryType::Own => {
                    errors.push(BulkItemError {
                        order_id: order.order_id,
                        reason: "not an own-delivery order".to_string(),
                    })
                }
                Some(order) => {
                    let ord = record_ref(&order.id, "order")?;
                    targets.push((ord, order.order_id));
                }
            }
        }

        if !errors.is_empty() {
            return Err(LifecycleError::BulkValidation(errors));
        }

        let agt = record_ref(&agent.id, "agent")?;
        let now = now_millis();
        let entry = TimelineEntry::new(
            now,
            assigned_by,
            TimelineAction::AgentAssigned,
            Some(format!("{} assigned (bulk)", agent.name)),
        );

        let orders: Vec<RecordId> = targets.iter().map(|(ord, _)| ord.clone()).collect();
        let order_refs: Vec<String> = orders.iter().map(|ord| ord.to_string()).collect();
        let assigned: Vec<String> = targets.into_iter().map(|(_, oid)| oid).collect();
        let count = orders.len() as i64;

        self.db
            .query(BULK_ASSIGN_TXN)
            .bind(("orders", orders))
            .bind(("order_refs", order_refs))
            .bind(("agt", agt.clone()))
            .bind(("agt_ref", agt.to_string()))
            .bind(("entry", entry))
            .bind(("count", count))
            .bind(("now", now))
            .await
            .and_then(|response| response.check())
            .map_err(|e| classify_commit_error(e, "in batch"))?;

        tracing::info!(
            agent = %agt,
            count = count,
            assigned_by = %assigned_by,
            "Bulk agent assignment committed"
        );

        let agent = self.read_back_agent(&agt).await?;
        Ok(BulkAssignOutcome {
            assigned_orders_count: assigned.len(),
            assigned_orders: assigned,
            agent: AgentSummary::from(&agent),
        })
    }

    /// Remove the agent assignment from an order.
    ///
    /// The previous agent is only freed to AVAILABLE when its
    /// `current_order_id` points at this order; an agent holding other
    /// orders keeps its state.
    pub async fn unassign_agent(
        &self,
        order_id: &str,
        reason: &str,
        unassigned_by: &str,
    ) -> LifecycleResult<UnassignmentOutcome> {
        let order = self
            .orders
            .resolve(order_id)
            .await?
            .ok_or_else(|| LifecycleError::OrderNotFound(order_id.to_string()))?;

        let Some(agent_ref) = order.assigned_agent_id.clone() else {
            return Err(LifecycleError::NotAssigned(order.order_id));
        };

        let ord = record_ref(&order.id, "order")?;
        let prev_agent = self.agents.find_by_id(&agent_ref.to_string()).await?;
        let now = now_millis();
        let entry = TimelineEntry::new(
            now,
            unassigned_by,
            TimelineAction::AgentUnassigned,
            Some(format!("Agent unassigned: {}", reason)),
        );

        match &prev_agent {
            Some(agent) => {
                let agt = record_ref(&agent.id, "agent")?;
                self.db
                    .query(UNASSIGN_TXN)
                    .bind(("ord", ord.clone()))
                    .bind(("agt", agt))
                    .bind(("ord_ref", ord.to_string()))
                    .bind(("entry", entry))
                    .bind(("reason", reason.to_string()))
                    .bind(("now", now))
                    .await
                    .and_then(|response| response.check())
                    .map_err(|e| classify_commit_error(e, &order.order_id))?;
            }
            None => {
                // Dangling agent reference; unassign the order side alone
                tracing::warn!(
                    order_id = %order.order_id,
                    agent = %agent_ref,
                    "Assigned agent record missing during unassignment"
                );
                self.db
                    .query(UNASSIGN_ORDER_ONLY_TXN)
                    .bind(("ord", ord.clone()))
                    .bind(("entry", entry))
                    .bind(("reason", reason.to_string()))
                    .bind(("now", now))
                    .await
                    .and_then(|response| response.check())
                    .map_err(|e| classify_commit_error(e, &order.order_id))?;
            }
        }

        tracing::info!(
            order_id = %order.order_id,
            reason = %reason,
            unassigned_by = %unassigned_by,
            "Agent unassigned from order"
        );

        let order = self.read_back_order(&ord).await?;
        Ok(UnassignmentOutcome {
            order,
            previous_agent: prev_agent.as_ref().map(AgentSummary::from),
            reason: reason.to_string(),
        })
    }

    /// Unassign a batch of orders ([`BulkPolicy::BestEffort`]).
    ///
    /// Orders without an assignment (or unknown ids) are reported in
    /// `errors` and skipped; the valid remainder commits in one
    /// transaction. Each affected agent is freed only when the batch
    /// includes the order its `current_order_id` points at.
    pub async fn bulk_unassign(
        &self,
        order_ids: &[String],
        reason: &str,
        unassigned_by: &str,
    ) -> LifecycleResult<BulkUnassignOutcome> {
        if order_ids.is_empty() {
            return Err(LifecycleError::Validation(
                "orderIds must not be empty".to_string(),
            ));
        }
        if order_ids.len() > MAX_BULK_ORDERS {
            return Err(LifecycleError::Validation(format!(
                "orderIds exceeds maximum bulk size ({MAX_BULK_ORDERS})"
            )));
        }

        let mut errors: Vec<BulkItemError> = Vec::new();
        let mut orders: Vec<RecordId> = Vec::new();
        let mut unassigned: Vec<String> = Vec::new();
        let mut agent_refs: Vec<String> = Vec::new();

        for id in order_ids {
            match self.orders.resolve(id).await? {
                None => errors.push(BulkItemError {
                    order_id: id.clone(),
                    reason: "not found".to_string(),
                }),
                Some(order) => match order.assigned_agent_id {
                    None => errors.push(BulkItemError {
                        order_id: order.order_id,
                        reason: "no agent assigned".to_string(),
                    }),
                    Some(agent_ref) => {
                        orders.push(record_ref(&order.id, "order")?);
                        unassigned.push(order.order_id);
                        let agent_ref = agent_ref.to_string();
                        if !agent_refs.contains(&agent_ref) {
                            agent_refs.push(agent_ref);
                        }
                    }
                },
            }
        }

        if orders.is_empty() {
            return Ok(BulkUnassignOutcome {
                unassigned_orders_count: 0,
                unassigned_orders: vec![],
                affected_agents: vec![],
                errors,
            });
        }

        // Group affected agents; skip dangling references
        let mut agents: Vec<RecordId> = Vec::new();
        let mut affected: Vec<AgentSummary> = Vec::new();
        for agent_ref in &agent_refs {
            match self.agents.find_by_id(agent_ref).await? {
                Some(agent) => {
                    agents.push(record_ref(&agent.id, "agent")?);
                    affected.push(AgentSummary::from(&agent));
                }
                None => tracing::warn!(agent = %agent_ref, "Assigned agent record missing during bulk unassignment"),
            }
        }

        let now = now_millis();
        let entry = TimelineEntry::new(
            now,
            unassigned_by,
            TimelineAction::AgentUnassigned,
            Some(format!("Agent unassigned: {}", reason)),
        );
        let order_refs: Vec<String> = orders.iter().map(|ord| ord.to_string()).collect();

        self.db
            .query(BULK_UNASSIGN_TXN)
            .bind(("orders", orders))
            .bind(("order_refs", order_refs))
            .bind(("agents", agents))
            .bind(("entry", entry))
            .bind(("reason", reason.to_string()))
            .bind(("now", now))
            .await
            .and_then(|response| response.check())
            .map_err(|e| classify_commit_error(e, "in batch"))?;

        tracing::info!(
            count = unassigned.len(),
            skipped = errors.len(),
            unassigned_by = %unassigned_by,
            "Bulk agent unassignment committed"
        );

        Ok(BulkUnassignOutcome {
            unassigned_orders_count: unassigned.len(),
            unassigned_orders: unassigned,
            affected_agents: affected,
            errors,
        })
    }

    /// Change an order's status and append the transition to the timeline.
    ///
    /// No transition table is enforced: any status may follow any other.
    /// The Pending↔Processing pair is additionally driven by assignment.
    pub async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        note: Option<String>,
        updated_by: &str,
    ) -> LifecycleResult<Order> {
        let order = self
            .orders
            .resolve(order_id)
            .await?
            .ok_or_else(|| LifecycleError::OrderNotFound(order_id.to_string()))?;

        let ord = record_ref(&order.id, "order")?;
        let now = now_millis();
        let transition = match note {
            Some(n) => format!("{} → {}: {}", order.status, new_status, n),
            None => format!("{} → {}", order.status, new_status),
        };
        let entry = TimelineEntry::new(
            now,
            updated_by,
            TimelineAction::StatusChanged,
            Some(transition),
        );

        let updated = self.orders.update_status(&ord, new_status, entry, now).await?;

        tracing::info!(
            order_id = %updated.order_id,
            status = %new_status,
            updated_by = %updated_by,
            "Order status updated"
        );

        Ok(updated)
    }

    async fn read_back_order(&self, ord: &RecordId) -> LifecycleResult<Order> {
        self.orders
            .find_by_id(&ord.to_string())
            .await?
            .ok_or_else(|| LifecycleError::OrderNotFound(ord.to_string()))
    }

    async fn read_back_agent(&self, agt: &RecordId) -> LifecycleResult<Agent> {
        self.agents
            .find_by_id(&agt.to_string())
            .await?
            .ok_or_else(|| LifecycleError::AgentNotFound(agt.to_string()))
    }
}

/// Extract the record id from a loaded document
pub(crate) fn record_ref(
    id: &Option<RecordId>,
    table: &str,
) -> Result<RecordId, LifecycleError> {
    id.clone().ok_or_else(|| {
        LifecycleError::Storage(RepoError::Database(format!(
            "Loaded {table} document has no record id"
        )))
    })
}
