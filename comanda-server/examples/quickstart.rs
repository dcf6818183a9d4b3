//! Quickstart - seed a catalog and run one order through its lifecycle
//!
//! Boots the full server state under WORK_DIR (default ./data), registers
//! a shop, a customer and two items, then drives a multi-line order from
//! creation to completion:
//!
//! 1. Seed the catalog
//! 2. Create an order (stock withdrawn, table claimed)
//! 3. Read it back by table
//! 4. Complete it (table released)
//!
//! Run: cargo run -p comanda-server --example quickstart

use comanda_server::{print_banner, Config, ServerState};
use shared::order::OrderLineRequest;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Environment: .env overrides, work dir layout, logging
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let logs_dir = config.logs_dir().to_string_lossy().into_owned();
    let log_dir = config.log_to_file.then_some(logs_dir.as_str());
    comanda_server::init_logger_with_file(Some(&config.log_level), log_dir);

    print_banner();
    tracing::info!(work_dir = %config.work_dir, "Comanda server starting...");

    let state = ServerState::initialize(&config);

    println!("=== 1. Seeding catalog ===");
    let shop = state.catalog.register_shop(1, "Harbour Kitchen", 12)?;
    let customer = state.catalog.register_customer(2, "Walk-in")?;
    state
        .catalog
        .register_item(1, shop.id, "Grilled Sea Bass", 457.78, 25)?;
    state
        .catalog
        .register_item(2, shop.id, "House Lemonade", 4.5, 100)?;
    println!("   shop {} with {} tables\n", shop.name, shop.table_count);

    println!("=== 2. Creating an order on table 1 ===");
    let lines = vec![
        OrderLineRequest {
            shop_id: shop.id,
            customer_id: customer.id,
            item_id: 1,
            quantity: 1,
            table_id: 1,
            total: 457.78,
            note: Some("window seat".to_string()),
        },
        OrderLineRequest {
            shop_id: shop.id,
            customer_id: customer.id,
            item_id: 2,
            quantity: 2,
            table_id: 1,
            total: 9.0,
            note: None,
        },
    ];
    let order = state.orders.create(&lines)?;
    let opened_at = chrono::DateTime::from_timestamp_millis(order.created_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    println!(
        "   order {} ({} lines, total {:.2}) opened at {}",
        order.group_id,
        order.items.len(),
        order.total,
        opened_at
    );
    println!(
        "   sea bass stock now: {}\n",
        state.stock.stock_of(1)?.map(|s| s.quantity).unwrap_or(0)
    );

    println!("=== 3. Reading it back by table ===");
    let by_table = state.orders.get_by_table(shop.id, 1)?;
    println!(
        "   table 1 -> group {} status {:?}\n",
        by_table.group_id, by_table.status
    );

    println!("=== 4. Completing the order ===");
    let closed = state.orders.complete(&order.group_id)?;
    println!(
        "   status {:?}, table occupied: {}",
        closed.status,
        state.tables.is_occupied(shop.id, 1)?
    );

    Ok(())
}
