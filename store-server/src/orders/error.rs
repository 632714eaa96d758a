use crate::db::repository::RepoError;
use crate::utils::AppError;
use serde::Serialize;
use thiserror::Error;

/// Marker thrown inside assignment transactions when the compare-and-swap
/// on `assigned_agent_id` fails. Surfaced through the store error text.
pub(crate) const ALREADY_ASSIGNED_MARKER: &str = "order_already_assigned";

/// Per-item failure inside a bulk call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemError {
    pub order_id: String,
    pub reason: String,
}

/// Lifecycle engine errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Order {0} already has an assigned agent")]
    AlreadyAssigned(String),

    #[error("Order {0} has no assigned agent")]
    NotAssigned(String),

    #[error("Order {0} is not an own-delivery order")]
    IneligibleDeliveryType(String),

    #[error("Agent {0} is not available for assignment")]
    AgentUnavailable(String),

    #[error("Agent {0} is not assigned to order {1}")]
    AgentMismatch(String, String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Bulk validation failed for {} order(s)", .0.len())]
    BulkValidation(Vec<BulkItemError>),

    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),
}

/// 将事务提交错误按 THROW 标记分类
///
/// SurrealDB 把 THROW 的内容包在错误文本里，只能按字符串匹配。
pub(crate) fn classify_commit_error(err: surrealdb::Error, order_id: &str) -> LifecycleError {
    let text = err.to_string();
    if text.contains(ALREADY_ASSIGNED_MARKER) {
        LifecycleError::AlreadyAssigned(order_id.to_string())
    } else {
        tracing::error!(error = %text, "Lifecycle transaction failed");
        LifecycleError::Storage(RepoError::Database(text))
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::OrderNotFound(id) => {
                AppError::not_found(format!("Order not found: {}", id))
            }
            LifecycleError::AgentNotFound(id) => {
                AppError::not_found(format!("Agent not found: {}", id))
            }
            LifecycleError::AlreadyAssigned(id) => {
                AppError::conflict(format!("Order {} already has an assigned agent", id))
            }
            LifecycleError::NotAssigned(id) => {
                AppError::conflict(format!("Order {} has no assigned agent", id))
            }
            LifecycleError::IneligibleDeliveryType(id) => AppError::business_rule(format!(
                "Order {} is not an own-delivery order and cannot be agent-assigned",
                id
            )),
            LifecycleError::AgentUnavailable(id) => AppError::business_rule(format!(
                "Agent {} is not approved or not available for assignment",
                id
            )),
            LifecycleError::AgentMismatch(agent, order) => AppError::forbidden(format!(
                "Agent {} is not assigned to order {}",
                agent, order
            )),
            LifecycleError::Validation(msg) => AppError::validation(msg),
            LifecycleError::BulkValidation(errors) => {
                let details: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.order_id, e.reason))
                    .collect();
                AppError::validation(details.join("; "))
            }
            LifecycleError::Storage(e) => e.into(),
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
