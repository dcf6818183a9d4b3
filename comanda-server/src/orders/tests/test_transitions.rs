use super::*;

#[test]
fn test_complete_releases_table() {
    let (engine, store) = create_test_engine();
    let group_id = place_order(&engine, 1);

    let view = engine.complete(&group_id).unwrap();
    assert_eq!(view.status, OrderStatus::Closed);

    assert!(store.get_open_order(1, 1).unwrap().is_none());
    assert!(!store.get_occupancy(1, 1).unwrap().unwrap().occupied);

    // The table is free for the next order
    let next = place_order(&engine, 1);
    assert_ne!(next, group_id);
}

#[test]
fn test_complete_stamps_all_lines() {
    let (engine, store) = create_test_engine();
    let created = engine
        .create(&[line(1, 1, 2, 457.78), line(7, 1, 2, 12.5)])
        .unwrap();

    engine.complete(&created.group_id).unwrap();

    let rows = store.get_group_lines(&created.group_id).unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.status, OrderStatus::Closed);
        assert!(row.updated_at >= row.created_at);
    }
}

#[test]
fn test_cancel_releases_table_keeps_stock_withdrawn() {
    let (engine, store) = create_test_engine();
    let group_id = place_order(&engine, 1);
    assert_eq!(store.get_stock(1).unwrap().unwrap().quantity, 9);

    let view = engine.cancel(&group_id).unwrap();
    assert_eq!(view.status, OrderStatus::Cancelled);

    // Cancelling releases the table but does not restock
    assert!(store.get_open_order(1, 1).unwrap().is_none());
    assert!(!store.get_occupancy(1, 1).unwrap().unwrap().occupied);
    assert_eq!(store.get_stock(1).unwrap().unwrap().quantity, 9);
}

#[test]
fn test_complete_twice_is_idempotent() {
    let (engine, _store) = create_test_engine();
    let group_id = place_order(&engine, 1);

    engine.complete(&group_id).unwrap();
    let view = engine.complete(&group_id).unwrap();
    assert_eq!(view.status, OrderStatus::Closed);
}

#[test]
fn test_cancel_twice_is_idempotent() {
    let (engine, _store) = create_test_engine();
    let group_id = place_order(&engine, 1);

    engine.cancel(&group_id).unwrap();
    let view = engine.cancel(&group_id).unwrap();
    assert_eq!(view.status, OrderStatus::Cancelled);
}

#[test]
fn test_cancel_after_complete_rejected() {
    let (engine, _store) = create_test_engine();
    let group_id = place_order(&engine, 1);
    engine.complete(&group_id).unwrap();

    let err = engine.cancel(&group_id).unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderAlreadyCompleted);
    assert_eq!(err.message, "Order has already been completed");
}

#[test]
fn test_complete_after_cancel_rejected() {
    let (engine, _store) = create_test_engine();
    let group_id = place_order(&engine, 1);
    engine.cancel(&group_id).unwrap();

    let err = engine.complete(&group_id).unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderAlreadyCancelled);
    assert_eq!(err.message, "Order has already been cancelled");
}

#[test]
fn test_transition_unknown_order() {
    let (engine, _store) = create_test_engine();

    let err = engine.complete("no-such-group").unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);

    let err = engine.cancel("no-such-group").unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[test]
fn test_terminal_reapply_leaves_new_claim_alone() {
    let (engine, store) = create_test_engine();
    let first = place_order(&engine, 1);
    engine.complete(&first).unwrap();

    // A newer order claims the table, then the old one is re-completed.
    let second = place_order(&engine, 1);
    engine.complete(&first).unwrap();

    assert_eq!(store.get_open_order(1, 1).unwrap(), Some(second));
    assert!(store.get_occupancy(1, 1).unwrap().unwrap().occupied);
}
