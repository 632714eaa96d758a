//! Earnings Calculator
//!
//! Delivery-completion settlement and read-side earnings reports.
//!
//! Settlement splits the delivery fee once: the commission is rounded to
//! whole currency units and the company revenue is the exact remainder, so
//! the two always sum to the fee. The order mutation (delivery fields,
//! DELIVERED status, timeline) and the agent mutation (completion counter,
//! cumulative earnings, capacity release) commit as ONE transaction — an
//! order can never be delivered without its agent being credited.

use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use super::error::{LifecycleError, LifecycleResult, classify_commit_error};
use super::lifecycle::record_ref;
use crate::db::models::{DEFAULT_COMMISSION_PERCENTAGE, TimelineAction, TimelineEntry};
use crate::db::repository::{AgentRepository, OrderRepository};
use crate::pricing::{commission_split, to_decimal, to_f64};
use crate::utils::time::now_millis;

const SETTLEMENT_TXN: &str = r#"
BEGIN TRANSACTION;
UPDATE $ord SET
    status = 'DELIVERED',
    delivery.completed_at = $now,
    delivery.distance = $distance,
    delivery.fee = $fee,
    delivery.agent_commission = $commission,
    delivery.company_revenue = $revenue,
    delivery.agent_commission_percentage = $pct,
    timeline += $entry,
    updated_at = $now;
UPDATE $agt SET
    performance.deliveries_completed += 1,
    performance.total_earnings += $commission,
    work_capacity = IF current_order_id = $ord_ref THEN 'AVAILABLE' ELSE work_capacity END,
    current_order_id = IF current_order_id = $ord_ref THEN NONE ELSE current_order_id END,
    assigned_orders -= $ord_ref,
    updated_at = $now;
COMMIT TRANSACTION;
"#;

/// Result of a delivery-completion settlement
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySettlement {
    pub order_id: String,
    pub agent_id: String,
    pub delivery_fee: f64,
    pub agent_commission: f64,
    pub company_revenue: f64,
    pub distance: f64,
}

/// One delivered order inside an earnings report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEarning {
    pub order_id: String,
    pub completed_at: i64,
    pub delivery_fee: f64,
    pub agent_commission: f64,
    pub distance: Option<f64>,
}

/// Aggregated earnings for an agent over a time window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsReport {
    pub agent_id: String,
    pub period: String,
    pub start: i64,
    pub end: i64,
    pub total_earnings: f64,
    pub total_deliveries: usize,
    pub average_earnings_per_delivery: f64,
    pub deliveries: Vec<DeliveryEarning>,
}

/// Earnings calculator — settlement plus read-side aggregation
#[derive(Clone)]
pub struct EarningsCalculator {
    db: Surreal<Db>,
    orders: OrderRepository,
    agents: AgentRepository,
}

impl EarningsCalculator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            agents: AgentRepository::new(db.clone()),
            db,
        }
    }

    /// Settle a completed delivery.
    ///
    /// The caller must be the agent assigned to the order — anyone else is
    /// rejected before any mutation happens.
    pub async fn record_delivery_completion(
        &self,
        order_id: &str,
        agent_id: &str,
        distance: f64,
        delivery_fee: f64,
        agent_commission_percentage: Option<u32>,
    ) -> LifecycleResult<DeliverySettlement> {
        let order = self
            .orders
            .resolve(order_id)
            .await?
            .ok_or_else(|| LifecycleError::OrderNotFound(order_id.to_string()))?;

        let agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LifecycleError::AgentNotFound(agent_id.to_string()))?;

        let agt = record_ref(&agent.id, "agent")?;
        if order.assigned_agent_id.as_ref() != Some(&agt) {
            return Err(LifecycleError::AgentMismatch(
                agt.to_string(),
                order.order_id,
            ));
        }

        let pct = agent_commission_percentage.unwrap_or(DEFAULT_COMMISSION_PERCENTAGE);
        let (commission, revenue) = commission_split(to_decimal(delivery_fee), pct);
        let commission = to_f64(commission);
        let revenue = to_f64(revenue);

        let ord = record_ref(&order.id, "order")?;
        let now = now_millis();
        let entry = TimelineEntry::new(
            now,
            agent.name.as_str(),
            TimelineAction::DeliveryCompleted,
            Some(format!("Delivered by {}", agent.name)),
        );

        self.db
            .query(SETTLEMENT_TXN)
            .bind(("ord", ord.clone()))
            .bind(("agt", agt.clone()))
            .bind(("ord_ref", ord.to_string()))
            .bind(("distance", distance))
            .bind(("fee", delivery_fee))
            .bind(("commission", commission))
            .bind(("revenue", revenue))
            .bind(("pct", pct))
            .bind(("entry", entry))
            .bind(("now", now))
            .await
            .and_then(|response| response.check())
            .map_err(|e| classify_commit_error(e, &order.order_id))?;

        tracing::info!(
            order_id = %order.order_id,
            agent = %agt,
            fee = delivery_fee,
            commission = commission,
            "Delivery completion settled"
        );

        Ok(DeliverySettlement {
            order_id: order.order_id,
            agent_id: agt.to_string(),
            delivery_fee,
            agent_commission: commission,
            company_revenue: revenue,
            distance,
        })
    }

    /// Aggregate an agent's delivered orders inside [start, end).
    ///
    /// Pure read: sums settled commissions, never recomputes splits.
    pub async fn earnings_report(
        &self,
        agent_id: &str,
        period: &str,
        start: i64,
        end: i64,
    ) -> LifecycleResult<EarningsReport> {
        let agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LifecycleError::AgentNotFound(agent_id.to_string()))?;
        let agt = record_ref(&agent.id, "agent")?;

        let delivered = self
            .orders
            .delivered_for_agent_in_window(&agt, start, end)
            .await?;

        let mut total = Decimal::ZERO;
        let mut deliveries = Vec::with_capacity(delivered.len());
        for order in delivered {
            let commission = order.delivery.agent_commission.unwrap_or(0.0);
            total += to_decimal(commission);
            deliveries.push(DeliveryEarning {
                order_id: order.order_id,
                completed_at: order.delivery.completed_at.unwrap_or(0),
                delivery_fee: order.delivery.fee.unwrap_or(0.0),
                agent_commission: commission,
                distance: order.delivery.distance,
            });
        }

        let count = deliveries.len();
        let average = if count == 0 {
            0.0
        } else {
            to_f64(total / Decimal::from(count as i64))
        };

        Ok(EarningsReport {
            agent_id: agt.to_string(),
            period: period.to_string(),
            start,
            end,
            total_earnings: to_f64(total),
            total_deliveries: count,
            average_earnings_per_delivery: average,
            deliveries,
        })
    }
}
