use super::*;

#[tokio::test]
async fn test_assign_agent_happy_path() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi Kumar", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.timeline.len(), 1);

    let outcome = engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    // Order side
    assert_eq!(outcome.order.status, OrderStatus::Processing);
    assert_eq!(outcome.order.assigned_agent_id, agent.id);
    assert_eq!(outcome.order.timeline.len(), 2);
    assert!(outcome.order.assigned_at.is_some());
    assert_eq!(outcome.agent.name, "Ravi Kumar");

    // Agent side
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.work_capacity, WorkCapacity::Busy);
    assert_eq!(agent.current_order_id, order.id);
    assert_eq!(agent.performance.orders_assigned, 1);
    assert!(agent.assigned_orders.contains(order.id.as_ref().unwrap()));
}

#[tokio::test]
async fn test_assign_is_exclusive_until_unassigned() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let first = create_approved_agent(&db, "Ravi", "9000000001").await;
    let second = create_approved_agent(&db, "Sunil", "9000000002").await;
    let engine = OrderLifecycle::new(db.clone());

    engine
        .assign_agent(&order.order_id, &key(&first.id), "admin1")
        .await
        .unwrap();

    let err = engine
        .assign_agent(&order.order_id, &key(&second.id), "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyAssigned(_)));

    // After unassignment the order is assignable again
    engine
        .unassign_agent(&order.order_id, "reassigning", "admin1")
        .await
        .unwrap();
    engine
        .assign_agent(&order.order_id, &key(&second.id), "admin1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_assign_rejects_third_party_delivery() {
    let db = test_db().await;
    let order = create_order(&db, DeliveryType::Shiprocket).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    let err = engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::IneligibleDeliveryType(_)));

    // No side effects on either document
    let order = reload_order(&db, &order).await;
    assert!(order.assigned_agent_id.is_none());
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.performance.orders_assigned, 0);
}

#[tokio::test]
async fn test_assign_rejects_unapproved_agent() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    // Freshly registered agent: pending, not approved
    let agent = AgentRepository::new(db.clone())
        .create(AgentCreate {
            name: "Newbie".to_string(),
            phone: "9000000009".to_string(),
            email: None,
        })
        .await
        .unwrap();
    let engine = OrderLifecycle::new(db.clone());

    let err = engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AgentUnavailable(_)));
}

#[tokio::test]
async fn test_assign_rejects_inactive_agent() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    AgentRepository::new(db.clone())
        .set_standing(&key(&agent.id), AccountStanding::Inactive, false)
        .await
        .unwrap();
    let engine = OrderLifecycle::new(db.clone());

    let err = engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AgentUnavailable(_)));
}

#[tokio::test]
async fn test_assign_allows_suspended_but_approved_agent() {
    // The eligibility gate is approved && not inactive; suspension alone
    // does not block assignment.
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    AgentRepository::new(db.clone())
        .set_standing(&key(&agent.id), AccountStanding::Suspended, false)
        .await
        .unwrap();
    let engine = OrderLifecycle::new(db.clone());

    let outcome = engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();
    assert_eq!(outcome.order.status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_assign_missing_order_and_agent() {
    let db = test_db().await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let order = create_own_order(&db).await;
    let engine = OrderLifecycle::new(db.clone());

    let err = engine
        .assign_agent("MP00000000000", &key(&agent.id), "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::OrderNotFound(_)));

    let err = engine
        .assign_agent(&order.order_id, "agent:missing", "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AgentNotFound(_)));
}

#[tokio::test]
async fn test_assign_leaves_non_pending_status_unchanged() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    engine
        .update_status(&order.order_id, OrderStatus::Shipped, None, "admin1")
        .await
        .unwrap();

    let outcome = engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();
    assert_eq!(outcome.order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_unassign_happy_path() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    let outcome = engine
        .unassign_agent(&order.order_id, "customer rescheduled", "admin2")
        .await
        .unwrap();

    // Processing reverts to Pending, assignment cleared, reason recorded
    assert_eq!(outcome.order.status, OrderStatus::Pending);
    assert!(outcome.order.assigned_agent_id.is_none());
    assert_eq!(
        outcome.order.unassigned_reason.as_deref(),
        Some("customer rescheduled")
    );
    assert!(outcome.order.unassigned_at.is_some());
    assert_eq!(outcome.order.timeline.len(), 3);
    assert_eq!(outcome.previous_agent.unwrap().name, "Ravi");

    // Agent freed
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.work_capacity, WorkCapacity::Available);
    assert!(agent.current_order_id.is_none());
    assert!(agent.assigned_orders.is_empty());
}

#[tokio::test]
async fn test_unassign_twice_is_rejected() {
    let db = test_db().await;
    let order = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    engine
        .assign_agent(&order.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();
    engine
        .unassign_agent(&order.order_id, "first", "admin1")
        .await
        .unwrap();

    let err = engine
        .unassign_agent(&order.order_id, "second", "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotAssigned(_)));
}

#[tokio::test]
async fn test_unassign_keeps_agent_holding_another_order() {
    let db = test_db().await;
    let order_a = create_own_order(&db).await;
    let order_b = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    // Second assignment moves the agent's pointer to order B
    engine
        .assign_agent(&order_a.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();
    engine
        .assign_agent(&order_b.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    engine
        .unassign_agent(&order_a.order_id, "reshuffle", "admin1")
        .await
        .unwrap();

    // Agent still holds order B: not reset
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.work_capacity, WorkCapacity::Busy);
    assert_eq!(agent.current_order_id, order_b.id);
    assert!(agent.assigned_orders.contains(order_b.id.as_ref().unwrap()));
    assert!(!agent.assigned_orders.contains(order_a.id.as_ref().unwrap()));
}
