//! redb-based persistence layer for the ordering engine
//!
//! A single embedded database file holds every table the engine touches, so
//! one write transaction can cover stock, order lines, the open-order index
//! and table occupancy as one atomic unit.
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `order_lines` | (group_id, line_id) | `OrderLine` (JSON) |
//! | `open_orders` | (shop_id, table_id) | group_id |
//! | `item_stock` | item_id | `ItemStock` (JSON) |
//! | `table_occupancy` | (shop_id, table_id) | `TableOccupancy` (JSON) |
//! | `shops` | shop_id | `Shop` (JSON) |
//! | `customers` | customer_id | `Customer` (JSON) |
//! | `items` | item_id | `Item` (JSON) |
//!
//! Mutating methods take a `&WriteTransaction` so the caller controls the
//! commit scope; read methods open their own read transaction.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{Customer, Item, ItemStock, Shop};
use crate::tables::TableOccupancy;
use shared::error::{AppError, ErrorCode};
use shared::order::OrderLine;

/// Order lines keyed by (group_id, line_id); line ids are snowflakes, so the
/// range scan for a group returns lines in insertion order.
const ORDER_LINES_TABLE: TableDefinition<(&str, i64), &[u8]> = TableDefinition::new("order_lines");

/// Open-order index: (shop_id, table_id) -> group_id. An entry exists exactly
/// while the group is open; this is what makes the one-open-order-per-table
/// constraint transactional.
const OPEN_ORDERS_TABLE: TableDefinition<(i64, i64), &str> = TableDefinition::new("open_orders");

/// Stock ledger: item_id -> ItemStock.
const ITEM_STOCK_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("item_stock");

/// Occupancy state: (shop_id, table_id) -> TableOccupancy.
const TABLE_OCCUPANCY_TABLE: TableDefinition<(i64, i64), &[u8]> =
    TableDefinition::new("table_occupancy");

/// Catalog records.
const SHOPS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("shops");
const CUSTOMERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("customers");
const ITEMS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("items");

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Map a low-level storage failure onto a stable error code.
///
/// Exact variants are matched first; the remainder is classified by message
/// text because redb surfaces I/O conditions as strings.
fn classify_store_error(e: &StoreError) -> ErrorCode {
    if let StoreError::Serialization(_) = e {
        return ErrorCode::SerializationError;
    }

    let text = e.to_string().to_lowercase();
    if text.contains("no space") || text.contains("disk full") || text.contains("enospc") {
        ErrorCode::StorageFull
    } else if text.contains("out of memory") || text.contains("cannot allocate") {
        ErrorCode::OutOfMemory
    } else if text.contains("corrupt") || text.contains("invalid database") {
        ErrorCode::StorageCorrupted
    } else {
        ErrorCode::SystemBusy
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let code = classify_store_error(&e);
        tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
        AppError::new(code)
    }
}

/// Row counts reported at startup.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub order_lines: u64,
    pub open_orders: u64,
    pub items: u64,
}

/// Handle to the embedded order store.
///
/// Cloning is cheap (`Arc` inside); all clones share the same database and
/// redb serializes writers, so concurrent use from multiple threads is safe.
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl OrderStore {
    /// Open (or create) the database file and make sure every table exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// In-memory store for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Create all tables up front so first reads never hit a missing table.
    fn init_tables(db: &Database) -> StoreResult<()> {
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(ORDER_LINES_TABLE)?;
            write_txn.open_table(OPEN_ORDERS_TABLE)?;
            write_txn.open_table(ITEM_STOCK_TABLE)?;
            write_txn.open_table(TABLE_OCCUPANCY_TABLE)?;
            write_txn.open_table(SHOPS_TABLE)?;
            write_txn.open_table(CUSTOMERS_TABLE)?;
            write_txn.open_table(ITEMS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction. Dropping it without commit rolls back.
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Commit a transaction, lifting the redb error into [`StoreError`].
    pub fn commit(&self, txn: WriteTransaction) -> StoreResult<()> {
        txn.commit()?;
        Ok(())
    }

    // ==================== Order lines ====================

    /// Insert or overwrite a line within the given transaction.
    pub fn store_line(&self, txn: &WriteTransaction, line: &OrderLine) -> StoreResult<()> {
        let mut table = txn.open_table(ORDER_LINES_TABLE)?;
        let bytes = serde_json::to_vec(line)?;
        table.insert((line.group_id.as_str(), line.id), bytes.as_slice())?;
        Ok(())
    }

    /// All lines of a group, in line-id (insertion) order.
    pub fn get_group_lines(&self, group_id: &str) -> StoreResult<Vec<OrderLine>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_LINES_TABLE)?;
        let mut lines = Vec::new();
        for entry in table.range((group_id, i64::MIN)..=(group_id, i64::MAX))? {
            let (_, value) = entry?;
            lines.push(serde_json::from_slice(value.value())?);
        }
        Ok(lines)
    }

    /// Same as [`get_group_lines`](Self::get_group_lines) but inside an open
    /// write transaction, seeing its uncommitted writes.
    pub fn get_group_lines_txn(
        &self,
        txn: &WriteTransaction,
        group_id: &str,
    ) -> StoreResult<Vec<OrderLine>> {
        let table = txn.open_table(ORDER_LINES_TABLE)?;
        let mut lines = Vec::new();
        for entry in table.range((group_id, i64::MIN)..=(group_id, i64::MAX))? {
            let (_, value) = entry?;
            lines.push(serde_json::from_slice(value.value())?);
        }
        Ok(lines)
    }

    /// Whether any line exists under this group id.
    pub fn group_exists(&self, txn: &WriteTransaction, group_id: &str) -> StoreResult<bool> {
        let table = txn.open_table(ORDER_LINES_TABLE)?;
        let mut range = table.range((group_id, i64::MIN)..=(group_id, i64::MAX))?;
        Ok(range.next().transpose()?.is_some())
    }

    /// Every stored line, across all groups and statuses.
    pub fn get_all_lines(&self) -> StoreResult<Vec<OrderLine>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_LINES_TABLE)?;
        let mut lines = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            lines.push(serde_json::from_slice(value.value())?);
        }
        Ok(lines)
    }

    // ==================== Open-order index ====================

    /// Group id of the open order at (shop, table), if any.
    pub fn get_open_order(&self, shop_id: i64, table_id: i64) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OPEN_ORDERS_TABLE)?;
        Ok(table
            .get((shop_id, table_id))?
            .map(|guard| guard.value().to_string()))
    }

    /// Transaction-scoped variant of [`get_open_order`](Self::get_open_order).
    pub fn get_open_order_txn(
        &self,
        txn: &WriteTransaction,
        shop_id: i64,
        table_id: i64,
    ) -> StoreResult<Option<String>> {
        let table = txn.open_table(OPEN_ORDERS_TABLE)?;
        Ok(table
            .get((shop_id, table_id))?
            .map(|guard| guard.value().to_string()))
    }

    /// Claim (shop, table) for a group within the given transaction.
    pub fn set_open_order(
        &self,
        txn: &WriteTransaction,
        shop_id: i64,
        table_id: i64,
        group_id: &str,
    ) -> StoreResult<()> {
        let mut table = txn.open_table(OPEN_ORDERS_TABLE)?;
        table.insert((shop_id, table_id), group_id)?;
        Ok(())
    }

    /// Release (shop, table) within the given transaction. Idempotent.
    pub fn clear_open_order(
        &self,
        txn: &WriteTransaction,
        shop_id: i64,
        table_id: i64,
    ) -> StoreResult<()> {
        let mut table = txn.open_table(OPEN_ORDERS_TABLE)?;
        table.remove((shop_id, table_id))?;
        Ok(())
    }

    // ==================== Stock ====================

    pub fn get_stock(&self, item_id: i64) -> StoreResult<Option<ItemStock>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEM_STOCK_TABLE)?;
        match table.get(item_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Transaction-scoped stock read, seeing earlier withdrawals in the same
    /// transaction.
    pub fn get_stock_txn(
        &self,
        txn: &WriteTransaction,
        item_id: i64,
    ) -> StoreResult<Option<ItemStock>> {
        let table = txn.open_table(ITEM_STOCK_TABLE)?;
        match table.get(item_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_stock(
        &self,
        txn: &WriteTransaction,
        item_id: i64,
        stock: &ItemStock,
    ) -> StoreResult<()> {
        let mut table = txn.open_table(ITEM_STOCK_TABLE)?;
        let bytes = serde_json::to_vec(stock)?;
        table.insert(item_id, bytes.as_slice())?;
        Ok(())
    }

    // ==================== Table occupancy ====================

    pub fn get_occupancy(
        &self,
        shop_id: i64,
        table_id: i64,
    ) -> StoreResult<Option<TableOccupancy>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_OCCUPANCY_TABLE)?;
        match table.get((shop_id, table_id))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn set_occupancy(
        &self,
        txn: &WriteTransaction,
        shop_id: i64,
        table_id: i64,
        state: &TableOccupancy,
    ) -> StoreResult<()> {
        let mut table = txn.open_table(TABLE_OCCUPANCY_TABLE)?;
        let bytes = serde_json::to_vec(state)?;
        table.insert((shop_id, table_id), bytes.as_slice())?;
        Ok(())
    }

    /// Occupancy records of one shop, in table-id order.
    pub fn get_shop_occupancy(&self, shop_id: i64) -> StoreResult<Vec<(i64, TableOccupancy)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_OCCUPANCY_TABLE)?;
        let mut out = Vec::new();
        for entry in table.range((shop_id, i64::MIN)..=(shop_id, i64::MAX))? {
            let (key, value) = entry?;
            let (_, table_id) = key.value();
            out.push((table_id, serde_json::from_slice(value.value())?));
        }
        Ok(out)
    }

    // ==================== Catalog ====================

    pub fn put_shop(&self, txn: &WriteTransaction, shop: &Shop) -> StoreResult<()> {
        let mut table = txn.open_table(SHOPS_TABLE)?;
        let bytes = serde_json::to_vec(shop)?;
        table.insert(shop.id, bytes.as_slice())?;
        Ok(())
    }

    pub fn get_shop(&self, shop_id: i64) -> StoreResult<Option<Shop>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SHOPS_TABLE)?;
        match table.get(shop_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_customer(&self, txn: &WriteTransaction, customer: &Customer) -> StoreResult<()> {
        let mut table = txn.open_table(CUSTOMERS_TABLE)?;
        let bytes = serde_json::to_vec(customer)?;
        table.insert(customer.id, bytes.as_slice())?;
        Ok(())
    }

    pub fn get_customer(&self, customer_id: i64) -> StoreResult<Option<Customer>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CUSTOMERS_TABLE)?;
        match table.get(customer_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_item(&self, txn: &WriteTransaction, item: &Item) -> StoreResult<()> {
        let mut table = txn.open_table(ITEMS_TABLE)?;
        let bytes = serde_json::to_vec(item)?;
        table.insert(item.id, bytes.as_slice())?;
        Ok(())
    }

    pub fn get_item(&self, item_id: i64) -> StoreResult<Option<Item>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;
        match table.get(item_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ==================== Stats ====================

    /// Row counts for startup logging.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let read_txn = self.db.begin_read()?;
        let order_lines = read_txn.open_table(ORDER_LINES_TABLE)?.len()?;
        let open_orders = read_txn.open_table(OPEN_ORDERS_TABLE)?.len()?;
        let items = read_txn.open_table(ITEMS_TABLE)?.len()?;
        Ok(StoreStats {
            order_lines,
            open_orders,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;
    use shared::util::now_millis;

    fn create_test_store() -> OrderStore {
        OrderStore::open_in_memory().unwrap()
    }

    fn test_line(group_id: &str, line_id: i64, item_id: i64) -> OrderLine {
        let now = now_millis();
        OrderLine {
            id: line_id,
            group_id: group_id.to_string(),
            shop_id: 1,
            customer_id: 2,
            item_id,
            quantity: 1,
            table_id: 1,
            status: OrderStatus::Open,
            total: 10.0,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_store_and_read_lines() {
        let store = create_test_store();

        let txn = store.begin_write().unwrap();
        store.store_line(&txn, &test_line("g-1", 1, 100)).unwrap();
        store.store_line(&txn, &test_line("g-1", 2, 101)).unwrap();
        txn.commit().unwrap();

        let lines = store.get_group_lines("g-1").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, 1);
        assert_eq!(lines[1].id, 2);
        assert_eq!(lines[0].item_id, 100);
    }

    #[test]
    fn test_group_range_isolation() {
        let store = create_test_store();

        let txn = store.begin_write().unwrap();
        store.store_line(&txn, &test_line("g-a", 1, 100)).unwrap();
        store.store_line(&txn, &test_line("g-b", 2, 200)).unwrap();
        txn.commit().unwrap();

        let a = store.get_group_lines("g-a").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].item_id, 100);

        let b = store.get_group_lines("g-b").unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].item_id, 200);

        assert!(store.get_group_lines("g-c").unwrap().is_empty());
        assert_eq!(store.get_all_lines().unwrap().len(), 2);
    }

    #[test]
    fn test_group_exists_sees_uncommitted_writes() {
        let store = create_test_store();

        let txn = store.begin_write().unwrap();
        assert!(!store.group_exists(&txn, "g-1").unwrap());
        store.store_line(&txn, &test_line("g-1", 1, 100)).unwrap();
        assert!(store.group_exists(&txn, "g-1").unwrap());
        txn.commit().unwrap();

        let txn = store.begin_write().unwrap();
        assert!(store.group_exists(&txn, "g-1").unwrap());
        drop(txn);
    }

    #[test]
    fn test_open_order_index() {
        let store = create_test_store();

        assert_eq!(store.get_open_order(1, 1).unwrap(), None);

        let txn = store.begin_write().unwrap();
        store.set_open_order(&txn, 1, 1, "g-1").unwrap();
        txn.commit().unwrap();

        assert_eq!(store.get_open_order(1, 1).unwrap(), Some("g-1".to_string()));
        // Same table number in a different shop is a different key
        assert_eq!(store.get_open_order(2, 1).unwrap(), None);

        let txn = store.begin_write().unwrap();
        store.clear_open_order(&txn, 1, 1).unwrap();
        // Clearing an absent entry must not fail
        store.clear_open_order(&txn, 9, 9).unwrap();
        txn.commit().unwrap();

        assert_eq!(store.get_open_order(1, 1).unwrap(), None);
    }

    #[test]
    fn test_stock_roundtrip() {
        let store = create_test_store();

        assert!(store.get_stock(7).unwrap().is_none());

        let txn = store.begin_write().unwrap();
        store
            .put_stock(
                &txn,
                7,
                &ItemStock {
                    quantity: 5,
                    available: true,
                },
            )
            .unwrap();
        txn.commit().unwrap();

        let stock = store.get_stock(7).unwrap().unwrap();
        assert_eq!(stock.quantity, 5);
        assert!(stock.available);
    }

    #[test]
    fn test_stock_txn_read_sees_own_writes() {
        let store = create_test_store();

        let txn = store.begin_write().unwrap();
        store
            .put_stock(
                &txn,
                7,
                &ItemStock {
                    quantity: 3,
                    available: true,
                },
            )
            .unwrap();
        let seen = store.get_stock_txn(&txn, 7).unwrap().unwrap();
        assert_eq!(seen.quantity, 3);
        txn.commit().unwrap();
    }

    #[test]
    fn test_occupancy_roundtrip() {
        let store = create_test_store();

        assert!(store.get_occupancy(1, 1).unwrap().is_none());

        let txn = store.begin_write().unwrap();
        store
            .set_occupancy(
                &txn,
                1,
                1,
                &TableOccupancy {
                    occupied: true,
                    updated_at: now_millis(),
                },
            )
            .unwrap();
        store
            .set_occupancy(
                &txn,
                1,
                3,
                &TableOccupancy {
                    occupied: false,
                    updated_at: now_millis(),
                },
            )
            .unwrap();
        txn.commit().unwrap();

        assert!(store.get_occupancy(1, 1).unwrap().unwrap().occupied);
        assert!(!store.get_occupancy(1, 3).unwrap().unwrap().occupied);

        let shop = store.get_shop_occupancy(1).unwrap();
        assert_eq!(shop.len(), 2);
        assert_eq!(shop[0].0, 1);
        assert_eq!(shop[1].0, 3);
    }

    #[test]
    fn test_catalog_records() {
        let store = create_test_store();
        let now = now_millis();

        let txn = store.begin_write().unwrap();
        store
            .put_shop(
                &txn,
                &Shop {
                    id: 1,
                    name: "Trattoria".to_string(),
                    table_count: 12,
                    created_at: now,
                },
            )
            .unwrap();
        store
            .put_customer(
                &txn,
                &Customer {
                    id: 2,
                    name: "Walk-in".to_string(),
                    created_at: now,
                },
            )
            .unwrap();
        store
            .put_item(
                &txn,
                &Item {
                    id: 3,
                    shop_id: 1,
                    name: "Paella".to_string(),
                    price: 18.5,
                    created_at: now,
                },
            )
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(store.get_shop(1).unwrap().unwrap().table_count, 12);
        assert_eq!(store.get_customer(2).unwrap().unwrap().name, "Walk-in");
        assert_eq!(store.get_item(3).unwrap().unwrap().price, 18.5);
        assert!(store.get_shop(99).unwrap().is_none());
    }

    #[test]
    fn test_uncommitted_transaction_discarded() {
        let store = create_test_store();

        let txn = store.begin_write().unwrap();
        store.store_line(&txn, &test_line("g-1", 1, 100)).unwrap();
        store.set_open_order(&txn, 1, 1, "g-1").unwrap();
        drop(txn);

        assert!(store.get_group_lines("g-1").unwrap().is_empty());
        assert_eq!(store.get_open_order(1, 1).unwrap(), None);
    }

    #[test]
    fn test_stats() {
        let store = create_test_store();

        let txn = store.begin_write().unwrap();
        store.store_line(&txn, &test_line("g-1", 1, 100)).unwrap();
        store.store_line(&txn, &test_line("g-1", 2, 101)).unwrap();
        store.set_open_order(&txn, 1, 1, "g-1").unwrap();
        txn.commit().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.order_lines, 2);
        assert_eq!(stats.open_orders, 1);
        assert_eq!(stats.items, 0);
    }

    #[test]
    fn test_classify_store_error() {
        let serde_err = serde_json::from_slice::<OrderLine>(b"not json").unwrap_err();
        let e = StoreError::Serialization(serde_err);
        assert_eq!(classify_store_error(&e), ErrorCode::SerializationError);

        let app: AppError = e.into();
        assert_eq!(app.code, ErrorCode::SerializationError);
    }
}
