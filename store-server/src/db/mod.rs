//! Database Module
//!
//! Embedded SurrealDB storage. Orders, agents and pricing rules each live in
//! their own table; cross-document mutations from the lifecycle engine run as
//! single transactions.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "printmart";
const DATABASE: &str = "store";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        init_schema(&db).await?;

        tracing::info!(path = %db_path, "Database connection established (SurrealDB RocksDB)");

        Ok(Self { db })
    }
}

/// Apply table and index definitions (idempotent).
///
/// Also used by tests against the in-memory engine.
pub async fn init_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS order_order_id ON TABLE order FIELDS order_id UNIQUE;
        DEFINE TABLE IF NOT EXISTS agent SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS agent_phone ON TABLE agent FIELDS phone UNIQUE;
        DEFINE TABLE IF NOT EXISTS delivery_pricing SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS delivery_pricing_tier ON TABLE delivery_pricing FIELDS max_distance_km UNIQUE;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;

    tracing::info!("Database schema applied");
    Ok(())
}
