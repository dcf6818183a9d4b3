//! Order lifecycle engine
//!
//! # Create flow
//!
//! ```text
//! create(lines)
//!     ├─ 1. Shape validation (non-empty, money/quantity bounds, note length)
//!     ├─ 2. Same-target guard (one call = one table order)
//!     ├─ 3. Per-line precondition gate, in request order:
//!     │      open order on table → shop → customer → item → table bound
//!     ├─ 4. Write transaction:
//!     │      authoritative conflict re-check, group-id probe,
//!     │      per-line stock withdraw, line inserts,
//!     │      open-order index claim, occupancy flag
//!     ├─ 5. Commit (any failure before it rolls everything back)
//!     └─ 6. Read back and fold into the aggregate view
//! ```
//!
//! The precondition gate in step 3 runs outside the transaction and exists
//! for orderly error reporting; the re-check in step 4 is what actually
//! guarantees one open order per (shop, table) under concurrency, because
//! redb serializes write transactions.

use std::sync::Arc;

use crate::catalog::{Directory, StockService};
use crate::db::OrderStore;
use crate::tables::TableService;
use crate::utils::validation::{validate_optional_text, MAX_NOTE_LEN};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::{OrderLine, OrderLineRequest, OrderStatus, OrderView};
use shared::util::{now_millis, snowflake_id};

use super::{formatter, money};

/// The order lifecycle engine.
///
/// Holds the store plus the collaborating services. Catalog existence checks
/// go through the [`Directory`] trait; stock and occupancy are concrete
/// services because their mutations must join the engine's write
/// transaction.
pub struct OrderEngine {
    store: OrderStore,
    directory: Arc<dyn Directory>,
    stock: StockService,
    tables: TableService,
}

impl OrderEngine {
    pub fn new(
        store: OrderStore,
        directory: Arc<dyn Directory>,
        stock: StockService,
        tables: TableService,
    ) -> Self {
        Self {
            store,
            directory,
            stock,
            tables,
        }
    }

    /// Create an order from an ordered, non-empty list of line requests.
    ///
    /// All lines must target the same (shop, customer, table); each request
    /// line becomes one stored line under a fresh UUID group id. Stock is
    /// decremented per line inside the same transaction that inserts the
    /// lines, claims the open-order index entry and marks the table
    /// occupied.
    pub fn create(&self, lines: &[OrderLineRequest]) -> AppResult<OrderView> {
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        for line in lines {
            money::validate_line(line)?;
            validate_optional_text(&line.note, "note", MAX_NOTE_LEN)?;
        }

        // One call creates one table order; mixed targets would break the
        // shared-field invariant the formatter enforces on every read.
        let first = &lines[0];
        for line in &lines[1..] {
            if line.shop_id != first.shop_id
                || line.customer_id != first.customer_id
                || line.table_id != first.table_id
            {
                return Err(AppError::validation(
                    "all lines of an order must share shop, customer and table",
                ));
            }
        }

        for line in lines {
            if self
                .store
                .get_open_order(line.shop_id, line.table_id)?
                .is_some()
            {
                return Err(AppError::new(ErrorCode::TableOccupied)
                    .with_detail("shop_id", line.shop_id)
                    .with_detail("table_id", line.table_id));
            }
            let shop = self.directory.find_shop(line.shop_id)?.ok_or_else(|| {
                AppError::new(ErrorCode::ShopNotFound).with_detail("shop_id", line.shop_id)
            })?;
            if self.directory.find_customer(line.customer_id)?.is_none() {
                return Err(AppError::new(ErrorCode::CustomerNotFound)
                    .with_detail("customer_id", line.customer_id));
            }
            if self.directory.find_item(line.item_id)?.is_none() {
                return Err(
                    AppError::new(ErrorCode::ItemNotFound).with_detail("item_id", line.item_id)
                );
            }
            if line.table_id < 1 || line.table_id > shop.table_count {
                return Err(AppError::new(ErrorCode::TableNotFound)
                    .with_detail("table_id", line.table_id)
                    .with_detail("table_count", shop.table_count));
            }
        }

        let group_id = uuid::Uuid::new_v4().to_string();
        let shop_id = first.shop_id;
        let table_id = first.table_id;

        let txn = self.store.begin_write()?;

        if self
            .store
            .get_open_order_txn(&txn, shop_id, table_id)?
            .is_some()
        {
            return Err(AppError::new(ErrorCode::TableOccupied)
                .with_detail("shop_id", shop_id)
                .with_detail("table_id", table_id));
        }
        if self.store.group_exists(&txn, &group_id)? {
            return Err(
                AppError::new(ErrorCode::DuplicateGroupId).with_detail("group_id", group_id)
            );
        }

        for line in lines {
            self.stock.withdraw_in(&txn, line.item_id, line.quantity)?;
        }

        let now = now_millis();
        let mut stored: Vec<OrderLine> = Vec::with_capacity(lines.len());
        for line in lines {
            // Snowflakes can collide within one millisecond; line ids must
            // be unique inside the group or an insert would overwrite.
            let mut id = snowflake_id();
            while stored.iter().any(|l| l.id == id) {
                id = snowflake_id();
            }
            let row = OrderLine {
                id,
                group_id: group_id.clone(),
                shop_id: line.shop_id,
                customer_id: line.customer_id,
                item_id: line.item_id,
                quantity: line.quantity,
                table_id: line.table_id,
                status: OrderStatus::Open,
                total: money::round(line.total),
                note: line.note.clone(),
                created_at: now,
                updated_at: now,
            };
            self.store.store_line(&txn, &row)?;
            stored.push(row);
        }

        self.store.set_open_order(&txn, shop_id, table_id, &group_id)?;
        self.tables.set_occupied_in(&txn, shop_id, table_id, true)?;
        self.store.commit(txn)?;

        let rows = self.store.get_group_lines(&group_id)?;
        if rows.is_empty() {
            return Err(AppError::internal("order missing after commit"));
        }
        let view = formatter::fold_lines(&rows)?;
        tracing::info!(
            group_id = %view.group_id,
            shop_id,
            table_id,
            lines = rows.len(),
            total = view.total,
            "Order created"
        );
        Ok(view)
    }

    /// The aggregate view of one order group.
    pub fn get_by_id(&self, group_id: &str) -> AppResult<OrderView> {
        let lines = self.store.get_group_lines(group_id)?;
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderNotFound)
                .with_detail("group_id", group_id.to_string()));
        }
        formatter::fold_lines(&lines)
    }

    /// The open order currently on (shop, table).
    ///
    /// The shop must exist; a valid shop with nothing open on the table
    /// reports "no orders" rather than "not found".
    pub fn get_by_table(&self, shop_id: i64, table_id: i64) -> AppResult<OrderView> {
        if self.directory.find_shop(shop_id)?.is_none() {
            return Err(AppError::new(ErrorCode::ShopNotFound).with_detail("shop_id", shop_id));
        }
        let Some(group_id) = self.store.get_open_order(shop_id, table_id)? else {
            return Err(AppError::new(ErrorCode::TableHasNoOrders)
                .with_detail("shop_id", shop_id)
                .with_detail("table_id", table_id));
        };
        let lines = self.store.get_group_lines(&group_id)?;
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::TableHasNoOrders)
                .with_detail("shop_id", shop_id)
                .with_detail("table_id", table_id));
        }
        formatter::fold_lines(&lines)
    }

    /// Every stored line across all groups, unaggregated.
    pub fn list(&self) -> AppResult<Vec<OrderLine>> {
        let lines = self.store.get_all_lines()?;
        if lines.is_empty() {
            return Err(AppError::with_message(ErrorCode::NotFound, "No orders found"));
        }
        Ok(lines)
    }

    /// Close an order. Re-closing a closed order succeeds (idempotent).
    pub fn complete(&self, group_id: &str) -> AppResult<OrderView> {
        self.transition(group_id, OrderStatus::Closed)
    }

    /// Cancel an order. Re-cancelling a cancelled order succeeds.
    pub fn cancel(&self, group_id: &str) -> AppResult<OrderView> {
        self.transition(group_id, OrderStatus::Cancelled)
    }

    fn transition(&self, group_id: &str, target: OrderStatus) -> AppResult<OrderView> {
        let txn = self.store.begin_write()?;
        let lines = self.store.get_group_lines_txn(&txn, group_id)?;
        let Some(current) = lines.first().map(|l| l.status) else {
            return Err(AppError::new(ErrorCode::OrderNotFound)
                .with_detail("group_id", group_id.to_string()));
        };

        if !current.can_transition_to(target) {
            return Err(match current {
                OrderStatus::Closed => AppError::new(ErrorCode::OrderAlreadyCompleted),
                OrderStatus::Cancelled => AppError::new(ErrorCode::OrderAlreadyCancelled),
                OrderStatus::Open => AppError::conflict(format!(
                    "order cannot move from {:?} to {:?}",
                    current, target
                )),
            }
            .with_detail("group_id", group_id.to_string()));
        }

        let was_open = current == OrderStatus::Open;
        let now = now_millis();
        let mut updated = Vec::with_capacity(lines.len());
        for mut line in lines {
            line.status = target;
            line.updated_at = now;
            self.store.store_line(&txn, &line)?;
            updated.push(line);
        }

        // Leaving the open state releases the table. Re-applying a terminal
        // state must not touch the index: the table may already belong to a
        // newer order.
        if was_open {
            let shop_id = updated[0].shop_id;
            let table_id = updated[0].table_id;
            self.store.clear_open_order(&txn, shop_id, table_id)?;
            self.tables.set_occupied_in(&txn, shop_id, table_id, false)?;
        }
        self.store.commit(txn)?;

        let view = formatter::fold_lines(&updated)?;
        tracing::info!(
            group_id = %view.group_id,
            status = ?view.status,
            released_table = was_open,
            "Order transitioned"
        );
        Ok(view)
    }
}
