use super::*;

#[tokio::test]
async fn test_bulk_policies_are_asymmetric_by_design() {
    assert_eq!(OrderLifecycle::BULK_ASSIGN_POLICY, BulkPolicy::AtomicAll);
    assert_eq!(OrderLifecycle::BULK_UNASSIGN_POLICY, BulkPolicy::BestEffort);
}

#[tokio::test]
async fn test_bulk_assign_all_valid() {
    let db = test_db().await;
    let orders = vec![
        create_own_order(&db).await,
        create_own_order(&db).await,
        create_own_order(&db).await,
    ];
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    let ids: Vec<String> = orders.iter().map(|o| o.order_id.clone()).collect();
    let outcome = engine
        .bulk_assign(&ids, &key(&agent.id), "admin1")
        .await
        .unwrap();

    assert_eq!(outcome.assigned_orders_count, 3);
    assert_eq!(outcome.assigned_orders, ids);

    // Every order advanced Pending→Processing and points at the agent
    for order in &orders {
        let order = reload_order(&db, order).await;
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.assigned_agent_id, agent.id);
        assert_eq!(order.timeline.len(), 2);
    }

    // One agent update: capacity count incremented by the batch size
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.performance.orders_assigned, 3);
    assert_eq!(agent.work_capacity, WorkCapacity::Busy);
    assert_eq!(agent.assigned_orders.len(), 3);
}

#[tokio::test]
async fn test_bulk_assign_aborts_whole_call_on_any_invalid_order() {
    let db = test_db().await;
    let valid_a = create_own_order(&db).await;
    let valid_b = create_own_order(&db).await;
    let third_party = create_order(&db, DeliveryType::Shiprocket).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    let ids = vec![
        valid_a.order_id.clone(),
        valid_b.order_id.clone(),
        third_party.order_id.clone(),
    ];
    let err = engine
        .bulk_assign(&ids, &key(&agent.id), "admin1")
        .await
        .unwrap_err();

    match err {
        LifecycleError::BulkValidation(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].order_id, third_party.order_id);
        }
        other => panic!("expected BulkValidation, got {:?}", other),
    }

    // Strict all-or-nothing: the valid orders were NOT assigned
    for order in [&valid_a, &valid_b] {
        let order = reload_order(&db, order).await;
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.assigned_agent_id.is_none());
    }
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.performance.orders_assigned, 0);
    assert_eq!(agent.work_capacity, WorkCapacity::Available);
}

#[tokio::test]
async fn test_bulk_assign_collects_every_validation_error() {
    let db = test_db().await;
    let assigned = create_own_order(&db).await;
    let other_agent = create_approved_agent(&db, "Sunil", "9000000002").await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    engine
        .assign_agent(&assigned.order_id, &key(&other_agent.id), "admin1")
        .await
        .unwrap();

    let ids = vec![assigned.order_id.clone(), "MP99999999999".to_string()];
    let err = engine
        .bulk_assign(&ids, &key(&agent.id), "admin1")
        .await
        .unwrap_err();

    match err {
        LifecycleError::BulkValidation(items) => {
            assert_eq!(items.len(), 2);
            assert!(items.iter().any(|e| e.reason.contains("already assigned")));
            assert!(items.iter().any(|e| e.reason.contains("not found")));
        }
        other => panic!("expected BulkValidation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bulk_assign_rejects_empty_list() {
    let db = test_db().await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    let err = engine
        .bulk_assign(&[], &key(&agent.id), "admin1")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));
}

#[tokio::test]
async fn test_bulk_unassign_is_best_effort() {
    let db = test_db().await;
    let order_a = create_own_order(&db).await;
    let order_b = create_own_order(&db).await;
    let untouched = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    engine
        .assign_agent(&order_a.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();
    engine
        .assign_agent(&order_b.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    // untouched has no assignment: reported, not aborting the call
    let ids = vec![
        order_a.order_id.clone(),
        order_b.order_id.clone(),
        untouched.order_id.clone(),
        "MP99999999999".to_string(),
    ];
    let outcome = engine
        .bulk_unassign(&ids, "route change", "admin1")
        .await
        .unwrap();

    assert_eq!(outcome.unassigned_orders_count, 2);
    assert_eq!(
        outcome.unassigned_orders,
        vec![order_a.order_id.clone(), order_b.order_id.clone()]
    );
    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.affected_agents.len(), 1);

    for order in [&order_a, &order_b] {
        let order = reload_order(&db, order).await;
        assert!(order.assigned_agent_id.is_none());
        assert_eq!(order.status, OrderStatus::Pending);
    }

    // The batch contained the order the agent's pointer was on: freed
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.work_capacity, WorkCapacity::Available);
    assert!(agent.current_order_id.is_none());
    assert!(agent.assigned_orders.is_empty());
}

#[tokio::test]
async fn test_bulk_unassign_keeps_agent_when_pointer_excluded() {
    let db = test_db().await;
    let order_a = create_own_order(&db).await;
    let order_b = create_own_order(&db).await;
    let agent = create_approved_agent(&db, "Ravi", "9000000001").await;
    let engine = OrderLifecycle::new(db.clone());

    engine
        .assign_agent(&order_a.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();
    // Pointer moves to order B
    engine
        .assign_agent(&order_b.order_id, &key(&agent.id), "admin1")
        .await
        .unwrap();

    let outcome = engine
        .bulk_unassign(&[order_a.order_id.clone()], "partial", "admin1")
        .await
        .unwrap();
    assert_eq!(outcome.unassigned_orders_count, 1);

    // Pointer order not in the batch: only updated_at refreshed
    let agent = reload_agent(&db, &agent).await;
    assert_eq!(agent.work_capacity, WorkCapacity::Busy);
    assert_eq!(agent.current_order_id, order_b.id);
}

#[tokio::test]
async fn test_bulk_unassign_all_invalid_reports_only_errors() {
    let db = test_db().await;
    let unassigned = create_own_order(&db).await;
    let engine = OrderLifecycle::new(db.clone());

    let outcome = engine
        .bulk_unassign(&[unassigned.order_id.clone()], "cleanup", "admin1")
        .await
        .unwrap();
    assert_eq!(outcome.unassigned_orders_count, 0);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.affected_agents.is_empty());
}
