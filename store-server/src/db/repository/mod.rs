//! Repository Module
//!
//! Provides CRUD and query access to SurrealDB tables. Repositories are thin
//! wrappers: single-document reads and writes only. Multi-document mutations
//! belong to the lifecycle engine, which commits them transactionally.

pub mod agent;
pub mod delivery_pricing;
pub mod order;

// Re-exports
pub use agent::AgentRepository;
pub use delivery_pricing::DeliveryPricingRepository;
pub use order::OrderRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        use crate::utils::AppError;
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Database(msg) => AppError::Database(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "agent:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("agent", "abc");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Parse an id that may be in "table:key" or bare-key form
pub(crate) fn parse_record_id(table: &str, id: &str) -> RepoResult<surrealdb::RecordId> {
    if id.contains(':') {
        id.parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid record id format: {}", id)))
    } else {
        Ok(surrealdb::RecordId::from_table_key(table, id))
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
