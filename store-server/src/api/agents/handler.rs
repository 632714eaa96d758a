//! Delivery Agent API Handlers
//!
//! 时间窗口解析在 handler 层完成 (业务时区)，
//! 引擎只接收 `i64` Unix millis。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Datelike;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{
    AccountStanding, Agent, AgentCreate, AgentListFilter, AgentUpdate, Order, WorkCapacity,
};
use crate::db::repository::{AgentRepository, OrderRepository};
use crate::orders::{EarningsCalculator, EarningsReport};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, time};

/// Agent response with the legacy combined status view derived at the boundary
#[derive(Debug, Serialize)]
pub struct AgentView {
    #[serde(flatten)]
    pub agent: Agent,
    /// Derived legacy view: pending/suspended/inactive/busy/available
    pub status: &'static str,
}

fn view(agent: Agent) -> AgentView {
    let status = agent.legacy_status();
    AgentView { agent, status }
}

fn parse_standing(value: &str) -> AppResult<AccountStanding> {
    let parsed = match value.to_uppercase().as_str() {
        "PENDING" => AccountStanding::Pending,
        "ACTIVE" => AccountStanding::Active,
        "SUSPENDED" => AccountStanding::Suspended,
        "INACTIVE" => AccountStanding::Inactive,
        _ => {
            return Err(AppError::validation(format!(
                "Invalid account standing: {}",
                value
            )));
        }
    };
    Ok(parsed)
}

fn parse_capacity(value: &str) -> AppResult<WorkCapacity> {
    let parsed = match value.to_uppercase().as_str() {
        "AVAILABLE" => WorkCapacity::Available,
        "BUSY" => WorkCapacity::Busy,
        _ => {
            return Err(AppError::validation(format!(
                "Invalid work capacity: {}",
                value
            )));
        }
    };
    Ok(parsed)
}

/// Query params for listing agents
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub standing: Option<String>,
    pub capacity: Option<String>,
    pub approved: Option<bool>,
}

/// GET /api/agents - 配送员列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<AgentView>>> {
    let filter = AgentListFilter {
        account_standing: query.standing.as_deref().map(parse_standing).transpose()?,
        work_capacity: query.capacity.as_deref().map(parse_capacity).transpose()?,
        approved: query.approved,
    };
    let repo = AgentRepository::new(state.db.clone());
    let agents = repo.find_all(filter).await?;
    Ok(Json(agents.into_iter().map(view).collect()))
}

/// GET /api/agents/{id} - 获取单个配送员
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AgentView>> {
    let repo = AgentRepository::new(state.db.clone());
    let agent = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Agent {} not found", id)))?;
    Ok(Json(view(agent)))
}

/// POST /api/agents - 注册配送员 (pending + 未审批)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AgentCreate>,
) -> AppResult<Json<AgentView>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;

    let repo = AgentRepository::new(state.db.clone());
    let agent = repo.create(payload).await?;

    tracing::info!(agent = %agent.name, "Agent registered");
    Ok(Json(view(agent)))
}

/// PUT /api/agents/{id} - 更新配送员资料
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AgentUpdate>,
) -> AppResult<Json<AgentView>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;

    let repo = AgentRepository::new(state.db.clone());
    let agent = repo.update(&id, payload).await?;
    Ok(Json(view(agent)))
}

/// POST /api/agents/{id}/approve - 审批通过，进入 active
pub async fn approve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AgentView>> {
    let repo = AgentRepository::new(state.db.clone());
    let agent = repo.set_standing(&id, AccountStanding::Active, true).await?;
    tracing::info!(agent = %agent.name, "Agent approved");
    Ok(Json(view(agent)))
}

/// POST /api/agents/{id}/suspend - 暂停账号
pub async fn suspend(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AgentView>> {
    let repo = AgentRepository::new(state.db.clone());
    let agent = repo
        .set_standing(&id, AccountStanding::Suspended, false)
        .await?;
    tracing::info!(agent = %agent.name, "Agent suspended");
    Ok(Json(view(agent)))
}

/// POST /api/agents/{id}/reactivate - 恢复账号
pub async fn reactivate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AgentView>> {
    let repo = AgentRepository::new(state.db.clone());
    let agent = repo
        .set_standing(&id, AccountStanding::Active, false)
        .await?;
    tracing::info!(agent = %agent.name, "Agent reactivated");
    Ok(Json(view(agent)))
}

/// Query params for an agent's order list
#[derive(Debug, Deserialize)]
pub struct AgentOrdersQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/agents/{id}/orders - 配送员名下订单
pub async fn orders(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<AgentOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let agents = AgentRepository::new(state.db.clone());
    let agent = agents
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Agent {} not found", id)))?;
    let agent_id = agent
        .id
        .ok_or_else(|| AppError::internal("Loaded agent document has no record id"))?;

    let repo = OrderRepository::new(state.db.clone());
    let orders = repo
        .find_for_agent(&agent_id, query.limit, query.offset)
        .await?;
    Ok(Json(orders))
}

// ============================================================================
// Earnings report
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsQuery {
    #[serde(default = "default_period")]
    pub period: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn default_period() -> String {
    "monthly".to_string()
}

/// 解析报表时间窗口 (业务时区)
///
/// daily = 当日零点起; weekly = 滚动 7 天; monthly = 本月 1 号起;
/// yearly = 1 月 1 日起; custom = 显式日期区间 (end 为闭区间日期)。
fn resolve_window(
    period: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    tz: Tz,
) -> AppResult<(i64, i64)> {
    let now = time::now_millis();
    let today = time::today(tz);

    match period {
        "daily" => Ok((time::day_start_millis(today, tz), now)),
        "weekly" => Ok((now - 7 * 24 * 60 * 60 * 1000, now)),
        "monthly" => {
            let month_start = today.with_day(1).unwrap_or(today);
            Ok((time::day_start_millis(month_start, tz), now))
        }
        "yearly" => {
            let year_start = today
                .with_month(1)
                .and_then(|d| d.with_day(1))
                .unwrap_or(today);
            Ok((time::day_start_millis(year_start, tz), now))
        }
        "custom" => {
            let (Some(start), Some(end)) = (start_date, end_date) else {
                return Err(AppError::validation(
                    "startDate and endDate are required for a custom period",
                ));
            };
            let start = time::parse_date(start)?;
            let end = time::parse_date(end)?;
            if end < start {
                return Err(AppError::validation("endDate must not precede startDate"));
            }
            Ok((
                time::day_start_millis(start, tz),
                time::day_end_millis(end, tz),
            ))
        }
        other => Err(AppError::validation(format!("Invalid period: {}", other))),
    }
}

/// GET /api/agents/{id}/earnings - 配送员收益报表
pub async fn earnings(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<EarningsQuery>,
) -> AppResult<Json<EarningsReport>> {
    let (start, end) = resolve_window(
        &query.period,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        state.config.timezone,
    )?;

    tracing::debug!(
        agent = %id,
        period = %query.period,
        start = start,
        end = end,
        "Building earnings report"
    );

    let calculator = EarningsCalculator::new(state.db.clone());
    let report = calculator.earnings_report(&id, &query.period, start, end).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_window_rejects_unknown_period() {
        let tz = chrono_tz::Asia::Kolkata;
        assert!(resolve_window("hourly", None, None, tz).is_err());
    }

    #[test]
    fn test_resolve_window_custom_requires_both_dates() {
        let tz = chrono_tz::Asia::Kolkata;
        assert!(resolve_window("custom", Some("2026-08-01"), None, tz).is_err());
        assert!(resolve_window("custom", None, None, tz).is_err());
    }

    #[test]
    fn test_resolve_window_custom_is_inclusive_of_end_date() {
        let tz = chrono_tz::Asia::Kolkata;
        let (start, end) =
            resolve_window("custom", Some("2026-08-01"), Some("2026-08-01"), tz).unwrap();
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
    }

    #[test]
    fn test_resolve_window_custom_rejects_inverted_range() {
        let tz = chrono_tz::Asia::Kolkata;
        assert!(resolve_window("custom", Some("2026-08-02"), Some("2026-08-01"), tz).is_err());
    }

    #[test]
    fn test_resolve_window_weekly_is_trailing_seven_days() {
        let tz = chrono_tz::Asia::Kolkata;
        let (start, end) = resolve_window("weekly", None, None, tz).unwrap();
        assert_eq!(end - start, 7 * 24 * 60 * 60 * 1000);
    }
}
