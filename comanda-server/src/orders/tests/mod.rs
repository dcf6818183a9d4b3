use super::*;
use std::sync::Arc;

use crate::catalog::{CatalogService, StockService};
use crate::db::OrderStore;
use crate::tables::TableService;
use shared::error::ErrorCode;
use shared::order::{OrderLineRequest, OrderStatus};

/// Engine over an in-memory store with a seeded catalog:
///
/// - shop 1 "Harbour Kitchen" with 8 tables
/// - customer 2 "Walk-in"
/// - item 1 "Grilled Sea Bass" at 457.78, 10 in stock
/// - item 7 "House Lemonade" at 12.50, 3 in stock
/// - item 9 "Daily Special" at 22.00, sold out
fn create_test_engine() -> (OrderEngine, OrderStore) {
    let store = OrderStore::open_in_memory().unwrap();
    let catalog = CatalogService::new(store.clone());
    catalog.register_shop(1, "Harbour Kitchen", 8).unwrap();
    catalog.register_customer(2, "Walk-in").unwrap();
    catalog
        .register_item(1, 1, "Grilled Sea Bass", 457.78, 10)
        .unwrap();
    catalog
        .register_item(7, 1, "House Lemonade", 12.5, 3)
        .unwrap();
    catalog.register_item(9, 1, "Daily Special", 22.0, 0).unwrap();

    let engine = OrderEngine::new(
        store.clone(),
        Arc::new(catalog),
        StockService::new(store.clone()),
        TableService::new(store.clone()),
    );
    (engine, store)
}

// ========================================================================
// Helper: request lines against the seeded catalog
// ========================================================================

fn line(item_id: i64, quantity: i32, table_id: i64, total: f64) -> OrderLineRequest {
    OrderLineRequest {
        shop_id: 1,
        customer_id: 2,
        item_id,
        quantity,
        table_id,
        total,
        note: None,
    }
}

fn place_order(engine: &OrderEngine, table_id: i64) -> String {
    let view = engine.create(&[line(1, 1, table_id, 457.78)]).unwrap();
    view.group_id
}

mod test_transitions;
