//! Order Repository
//!
//! Single-document reads and writes for orders. Assignment and settlement
//! mutations touch the agent document too and live in the lifecycle engine
//! instead, committed as one transaction.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{
    Order, OrderCreate, OrderListFilter, OrderStatus, OrderTotals, TimelineAction, TimelineEntry,
};
use crate::db::models::{DeliveryInfo, DeliveryType};
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// List orders with optional status / agent / urgent filters (paginated)
    pub async fn find_all(&self, filter: OrderListFilter) -> RepoResult<Vec<Order>> {
        let mut conditions: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.assigned_agent_id.is_some() {
            conditions.push("assigned_agent_id = $agent");
        }
        if filter.urgent.is_some() {
            conditions.push("urgent = $urgent");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.clamp(1, 500);
        let offset = filter.offset.max(0);
        let sql = format!(
            "SELECT * FROM order {} ORDER BY created_at DESC LIMIT {} START {}",
            where_clause, limit, offset
        );

        let mut query = self.base.db().query(sql);
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }
        if let Some(agent) = filter.assigned_agent_id {
            query = query.bind(("agent", agent.to_string()));
        }
        if let Some(urgent) = filter.urgent {
            query = query.bind(("urgent", urgent));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        Ok(orders)
    }

    /// Find order by record id ("order:xxx" or bare key)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let record_id = parse_record_id(TABLE, id)?;
        let order: Option<Order> = self.base.db().select(record_id).await?;
        Ok(order)
    }

    /// Find order by external order number (e.g. "MP202608071001")
    pub async fn find_by_order_id(&self, order_id: &str) -> RepoResult<Option<Order>> {
        let oid = order_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE order_id = $oid LIMIT 1")
            .bind(("oid", oid))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Resolve an identifier that may be either form
    pub async fn resolve(&self, id: &str) -> RepoResult<Option<Order>> {
        if let Some(order) = self.find_by_order_id(id).await? {
            return Ok(Some(order));
        }
        self.find_by_id(id).await
    }

    /// Total number of orders (used for order number generation)
    pub async fn count(&self) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM order GROUP ALL")
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Create a new order in Pending with its initial timeline entry
    pub async fn create(&self, data: OrderCreate) -> RepoResult<Order> {
        let now = chrono::Utc::now().timestamp_millis();
        let count = self.count().await?;
        let date_str = chrono::Utc::now().format("%Y%m%d").to_string();
        let order_id = format!("MP{}{}", date_str, 10000 + count + 1);

        let actor = data.created_by.unwrap_or_else(|| "system".to_string());
        let delivery = match data.delivery_type {
            DeliveryType::Own => DeliveryInfo::own(),
            DeliveryType::Shiprocket => DeliveryInfo::shiprocket(),
        };

        let order = Order {
            id: None,
            order_id,
            status: OrderStatus::Pending,
            delivery,
            assigned_agent_id: None,
            timeline: vec![TimelineEntry::new(
                now,
                actor,
                TimelineAction::OrderCreated,
                None,
            )],
            urgent: data.urgent,
            totals: OrderTotals { total: data.total },
            customer_name: data.customer_name,
            customer_phone: data.customer_phone,
            created_at: now,
            updated_at: now,
            assigned_at: None,
            unassigned_at: None,
            unassigned_reason: None,
        };

        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Set status and append one timeline entry
    pub async fn update_status(
        &self,
        id: &RecordId,
        status: OrderStatus,
        entry: TimelineEntry,
        now: i64,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $ord SET status = $status, timeline += $entry, updated_at = $now RETURN AFTER")
            .bind(("ord", id.clone()))
            .bind(("status", status))
            .bind(("entry", entry))
            .bind(("now", now))
            .await?;
        let updated: Vec<Order> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Orders currently or previously assigned to an agent (paginated)
    pub async fn find_for_agent(
        &self,
        agent: &RecordId,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Order>> {
        let sql = format!(
            "SELECT * FROM order WHERE assigned_agent_id = $agent ORDER BY created_at DESC LIMIT {} START {}",
            limit.clamp(1, 500),
            offset.max(0)
        );
        let orders: Vec<Order> = self
            .base
            .db()
            .query(sql)
            .bind(("agent", agent.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Delivered orders for an agent with completion inside [start, end),
    /// newest first. Feeds the earnings report.
    pub async fn delivered_for_agent_in_window(
        &self,
        agent: &RecordId,
        start: i64,
        end: i64,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                r#"
                SELECT * FROM order
                WHERE assigned_agent_id = $agent
                    AND status = 'DELIVERED'
                    AND delivery.completed_at >= $start
                    AND delivery.completed_at < $end
                ORDER BY delivery.completed_at DESC
                "#,
            )
            .bind(("agent", agent.to_string()))
            .bind(("start", start))
            .bind(("end", end))
            .await?
            .take(0)?;
        Ok(orders)
    }
}
