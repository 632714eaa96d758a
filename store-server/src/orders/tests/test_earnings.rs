use super::*;
use crate::pricing::to_decimal;

#[tokio::test]
async fn test_record_delivery_completion_settles_both_documents() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let lifecycle = OrderLifecycle::new(db.clone());
    let earnings = EarningsCalculator::new(db.clone());

    lifecycle
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    let settlement = earnings
        .record_delivery_completion(&order.order_id, &key(&agent.id), 4.0, 50.0, None)
        .await
        .unwrap();

    assert_eq!(settlement.delivery_fee, 50.0);
    assert_eq!(settlement.agent_commission, 35.0);
    assert_eq!(settlement.company_revenue, 15.0);
    assert_eq!(settlement.distance, 4.0);

    // Order side: delivered with settlement fields persisted
    let order = reload_order(&db, &order).await;
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.delivery.fee, Some(50.0));
    assert_eq!(order.delivery.agent_commission, Some(35.0));
    assert_eq!(order.delivery.company_revenue, Some(15.0));
    assert_eq!(order.delivery.agent_commission_percentage, Some(70));
    assert_eq!(order.delivery.distance, Some(4.0));
    assert!(order.delivery.completed_at.is_some());
    // Order keeps the agent reference for reporting
    assert_eq!(order.assigned_agent_id, agent.id);

    // Agent side: credited and freed in the same commit
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.performance.deliveries_completed, 1);
    assert_eq!(agent.performance.total_earnings, 35.0);
    assert_eq!(agent.work_capacity, WorkCapacity::Available);
    assert!(agent.current_order_id.is_none());
    assert!(agent.assigned_orders.is_empty());
}

#[tokio::test]
async fn test_record_delivery_custom_percentage() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let lifecycle = OrderLifecycle::new(db.clone());
    let earnings = EarningsCalculator::new(db.clone());

    lifecycle
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    let settlement = earnings
        .record_delivery_completion(&order.order_id, &key(&agent.id), 8.0, 80.0, Some(50))
        .await
        .unwrap();
    assert_eq!(settlement.agent_commission, 40.0);
    assert_eq!(settlement.company_revenue, 40.0);
}

#[tokio::test]
async fn test_record_delivery_rejects_wrong_agent() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let assigned = create_approved_agent(&db, "Ravi", "9000000001").await;
    let impostor = create_approved_agent(&db, "Sunil", "9000000002").await;
    let lifecycle = OrderLifecycle::new(db.clone());
    let earnings = EarningsCalculator::new(db.clone());

    lifecycle
        .assign_agent(&order.order_id, &key(&assigned.id), "admin1")
        .await
        .unwrap();

    let err = earnings
        .record_delivery_completion(&order.order_id, &key(&impostor.id), 4.0, 50.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AgentMismatch(_, _)));

    // No mutation occurred on either document
    let order = reload_order(&db, &order).await;
    assert_eq!(order.status, OrderStatus::Processing);
    assert!(order.delivery.fee.is_none());
    assert!(order.delivery.completed_at.is_none());
    let impostor = reload_agent(&db, &impostor).await;
    assert_eq!(impostor.performance.deliveries_completed, 0);
    assert_eq!(impostor.performance.total_earnings, 0.0);
}

#[tokio::test]
async fn test_record_delivery_rejects_unassigned_order() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let earnings = EarningsCalculator::new(db.clone());

    let err = earnings
        .record_delivery_completion(&order.order_id, &key(&agent.id), 4.0, 50.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AgentMismatch(_, _)));
}

#[tokio::test]
async fn test_settled_split_conserves_fee_exactly() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let lifecycle = OrderLifecycle::new(db.clone());
    let earnings = EarningsCalculator::new(db.clone());

    lifecycle
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    let settlement = earnings
        .record_delivery_completion(&order.order_id, &key(&agent.id), 6.2, 49.99, None)
        .await
        .unwrap();

    // commission rounded once to whole units, revenue is the exact remainder
    assert_eq!(settlement.agent_commission, 35.0);
    assert_eq!(settlement.company_revenue, 14.99);
    assert_eq!(
        to_decimal(settlement.agent_commission) + to_decimal(settlement.company_revenue),
        to_decimal(settlement.delivery_fee)
    );
}

async fn settle_one(
    db: &Surreal<Db>,
    agent: &Agent,
    fee: f64,
) -> Order {
    let order = create_own_order(db).await;
    let lifecycle = OrderLifecycle::new(db.clone());
    let earnings = EarningsCalculator::new(db.clone());
    lifecycle
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();
    earnings
        .record_delivery_completion(&order.order_id, &key(&agent.id), 3.0, fee, None)
        .await
        .unwrap();
    reload_order(db, &order).await
}

/// 把订单的交付时间改到指定时间戳 (测试窗口过滤用)
async fn backdate_completion(db: &Surreal<Db>, order: &Order, ts: i64) {
    db.query("UPDATE $ord SET delivery.completed_at = $ts")
        .bind(("ord", order.id.clone().unwrap()))
        .bind(("ts", ts))
        .await
        .unwrap()
        .check()
        .unwrap();
}

#[tokio::test]
async fn test_earnings_report_sums_only_the_window() {
    let db = test_db().await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let earnings = EarningsCalculator::new(db.clone());

    let inside_a = settle_one(&db, &agent, 50.0).await; // commission 35
    let inside_b = settle_one(&db, &agent, 100.0).await; // commission 70
    let outside = settle_one(&db, &agent, 60.0).await; // commission 42, moved out

    let now = chrono::Utc::now().timestamp_millis();
    let window = (now - 3_600_000, now + 3_600_000);
    backdate_completion(&db, &outside, window.0 - 1).await;

    let report = earnings
        .earnings_report(&key(&agent.id), "custom", window.0, window.1)
        .await
        .unwrap();

    assert_eq!(report.total_deliveries, 2);
    assert_eq!(report.total_earnings, 105.0);
    assert_eq!(report.average_earnings_per_delivery, 52.5);
    let ids: Vec<&str> = report.deliveries.iter().map(|d| d.order_id.as_str()).collect();
    assert!(ids.contains(&inside_a.order_id.as_str()));
    assert!(ids.contains(&inside_b.order_id.as_str()));
    assert!(!ids.contains(&outside.order_id.as_str()));
}

#[tokio::test]
async fn test_earnings_report_orders_newest_first() {
    let db = test_db().await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let earnings = EarningsCalculator::new(db.clone());

    let older = settle_one(&db, &agent, 50.0).await;
    let newer = settle_one(&db, &agent, 50.0).await;

    let now = chrono::Utc::now().timestamp_millis();
    backdate_completion(&db, &older, now - 120_000).await;
    backdate_completion(&db, &newer, now - 60_000).await;

    let report = earnings
        .earnings_report(&key(&agent.id), "daily", now - 3_600_000, now + 1)
        .await
        .unwrap();
    assert_eq!(report.deliveries.len(), 2);
    assert_eq!(report.deliveries[0].order_id, newer.order_id);
    assert_eq!(report.deliveries[1].order_id, older.order_id);
}

#[tokio::test]
async fn test_earnings_report_empty_window_has_zero_average() {
    let db = test_db().await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let earnings = EarningsCalculator::new(db.clone());

    let now = chrono::Utc::now().timestamp_millis();
    let report = earnings
        .earnings_report(&key(&agent.id), "weekly", now - 1000, now)
        .await
        .unwrap();
    assert_eq!(report.total_deliveries, 0);
    assert_eq!(report.total_earnings, 0.0);
    assert_eq!(report.average_earnings_per_delivery, 0.0);
    assert!(report.deliveries.is_empty());
}

#[tokio::test]
async fn test_earnings_report_unknown_agent() {
    let db = test_db().await;
    let earnings = EarningsCalculator::new(db.clone());
    let err = earnings
        .earnings_report("agent:missing", "daily", 0, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AgentNotFound(_)));
}
