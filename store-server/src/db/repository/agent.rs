//! Delivery Agent Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{
    AccountStanding, Agent, AgentCreate, AgentListFilter, AgentPerformance, AgentUpdate,
    WorkCapacity,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "agent";

#[derive(Clone)]
pub struct AgentRepository {
    base: BaseRepository,
}

impl AgentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// List agents with optional standing / capacity / approval filters
    pub async fn find_all(&self, filter: AgentListFilter) -> RepoResult<Vec<Agent>> {
        let mut conditions: Vec<&str> = Vec::new();
        if filter.account_standing.is_some() {
            conditions.push("account_standing = $standing");
        }
        if filter.work_capacity.is_some() {
            conditions.push("work_capacity = $capacity");
        }
        if filter.approved.is_some() {
            conditions.push("approved = $approved");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("SELECT * FROM agent {} ORDER BY name", where_clause);

        let mut query = self.base.db().query(sql);
        if let Some(standing) = filter.account_standing {
            query = query.bind(("standing", standing));
        }
        if let Some(capacity) = filter.work_capacity {
            query = query.bind(("capacity", capacity));
        }
        if let Some(approved) = filter.approved {
            query = query.bind(("approved", approved));
        }

        let agents: Vec<Agent> = query.await?.take(0)?;
        Ok(agents)
    }

    /// Find agent by record id ("agent:xxx" or bare key)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Agent>> {
        let record_id = parse_record_id(TABLE, id)?;
        let agent: Option<Agent> = self.base.db().select(record_id).await?;
        Ok(agent)
    }

    /// Find agent by phone number
    pub async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Agent>> {
        let phone_owned = phone.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM agent WHERE phone = $phone LIMIT 1")
            .bind(("phone", phone_owned))
            .await?;
        let agents: Vec<Agent> = result.take(0)?;
        Ok(agents.into_iter().next())
    }

    /// Register a new agent — pending and unapproved until an admin approves
    pub async fn create(&self, data: AgentCreate) -> RepoResult<Agent> {
        // Check duplicate phone
        if self.find_by_phone(&data.phone).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Agent with phone '{}' already exists",
                data.phone
            )));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let agent = Agent {
            id: None,
            name: data.name,
            phone: data.phone,
            email: data.email,
            account_standing: AccountStanding::Pending,
            work_capacity: WorkCapacity::Available,
            approved: false,
            current_order_id: None,
            assigned_orders: vec![],
            performance: AgentPerformance::default(),
            created_at: now,
            updated_at: now,
            assigned_at: None,
        };

        let created: Option<Agent> = self.base.db().create(TABLE).content(agent).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create agent".to_string()))
    }

    /// Update agent profile fields
    pub async fn update(&self, id: &str, data: AgentUpdate) -> RepoResult<Agent> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Agent {} not found", id)))?;

        // Check duplicate phone if changing
        if let Some(ref new_phone) = data.phone
            && new_phone != &existing.phone
            && self.find_by_phone(new_phone).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Agent with phone '{}' already exists",
                new_phone
            )));
        }

        let record_id = parse_record_id(TABLE, id)?;
        let now = chrono::Utc::now().timestamp_millis();
        let mut merge = serde_json::to_value(&data)
            .map_err(|e| RepoError::Validation(format!("Invalid agent update payload: {e}")))?;
        merge["updated_at"] = serde_json::json!(now);
        self.base
            .db()
            .query("UPDATE $agt MERGE $data")
            .bind(("agt", record_id))
            .bind(("data", merge))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Agent {} not found", id)))
    }

    /// Move an agent to a new account standing.
    ///
    /// Approval is the only transition that flips `approved`; suspension and
    /// reactivation leave it untouched.
    pub async fn set_standing(
        &self,
        id: &str,
        standing: AccountStanding,
        approve: bool,
    ) -> RepoResult<Agent> {
        // UPDATE on a missing record would create it; check existence first
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Agent {} not found", id)))?;
        let record_id = existing
            .id
            .ok_or_else(|| RepoError::Database("Loaded agent document has no record id".into()))?;

        let now = chrono::Utc::now().timestamp_millis();
        let sql = if approve {
            "UPDATE $agt SET account_standing = $standing, approved = true, updated_at = $now RETURN AFTER"
        } else {
            "UPDATE $agt SET account_standing = $standing, updated_at = $now RETURN AFTER"
        };
        let mut result = self
            .base
            .db()
            .query(sql)
            .bind(("agt", record_id.clone()))
            .bind(("standing", standing))
            .bind(("now", now))
            .await?;
        let updated: Vec<Agent> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Agent {} not found", record_id)))
    }
}
