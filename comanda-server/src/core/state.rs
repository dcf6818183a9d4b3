use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{CatalogService, StockService};
use crate::core::Config;
use crate::db::OrderStore;
use crate::orders::OrderEngine;
use crate::tables::TableService;

/// Server state, one instance per process
///
/// Holds the open store and every service built on it. Cloning is shallow;
/// all clones share the same database handle.
///
/// # Components
///
/// | Field | Type | Role |
/// |-------|------|------|
/// | config | Config | Immutable configuration |
/// | store | OrderStore | Embedded redb database |
/// | catalog | Arc\<CatalogService\> | Shop / customer / item directory |
/// | stock | Arc\<StockService\> | Per-item stock ledger |
/// | tables | Arc\<TableService\> | Table occupancy queries |
/// | orders | Arc\<OrderEngine\> | Order lifecycle operations |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database handle
    pub store: OrderStore,
    /// Catalog directory (existence checks + seeding)
    pub catalog: Arc<CatalogService>,
    /// Stock ledger
    pub stock: Arc<StockService>,
    /// Table occupancy service
    pub tables: Arc<TableService>,
    /// Order lifecycle engine
    pub orders: Arc<OrderEngine>,
}

impl ServerState {
    /// Initialize the full service stack
    ///
    /// Order:
    /// 1. work dir layout (database/, logs/)
    /// 2. embedded store
    /// 3. services and the engine
    ///
    /// # Panics
    ///
    /// Panics when the work dir cannot be created or the database cannot
    /// be opened; the process has nothing to start without them.
    pub fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Open the embedded store
        let store = OrderStore::open(config.db_path()).expect("Failed to open database");

        // 2. Wire the services around the shared store
        let catalog = Arc::new(CatalogService::new(store.clone()));
        let stock = StockService::new(store.clone());
        let tables = TableService::new(store.clone());
        let orders = Arc::new(OrderEngine::new(
            store.clone(),
            catalog.clone(),
            stock.clone(),
            tables.clone(),
        ));

        let state = Self {
            config: config.clone(),
            store,
            catalog,
            stock: Arc::new(stock),
            tables: Arc::new(tables),
            orders,
        };

        match state.store.stats() {
            Ok(stats) => tracing::info!(
                order_lines = stats.order_lines,
                open_orders = stats.open_orders,
                items = stats.items,
                "Store opened"
            ),
            Err(e) => tracing::warn!(error = %e, "Could not read store stats"),
        }

        state
    }

    /// The working directory
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// The order engine
    pub fn engine(&self) -> &OrderEngine {
        &self.orders
    }
}
