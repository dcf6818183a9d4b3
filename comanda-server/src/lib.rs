//! Comanda Server - embedded order lifecycle engine
//!
//! # Overview
//!
//! The core of a multi-shop table ordering backend:
//!
//! - **Order engine** (`orders`): transactional creation with stock and
//!   occupancy coupling, aggregate views, terminal transitions
//! - **Storage** (`db`): embedded `redb` store, one file, ACID write
//!   transactions
//! - **Catalog** (`catalog`): shop/customer/item directory and the stock
//!   ledger the engine draws from
//! - **Tables** (`tables`): per-(shop, table) occupancy state
//!
//! # Module structure
//!
//! ```text
//! comanda-server/src/
//! ├── core/      # configuration, server state
//! ├── db/        # embedded redb store
//! ├── catalog/   # directory (existence oracle) + stock ledger
//! ├── tables/    # table occupancy
//! ├── orders/    # engine, formatter, money rules
//! └── utils/     # logging, validation
//! ```

pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod tables;
pub mod utils;

// Re-export the public surface
pub use crate::core::{Config, ServerState};
pub use catalog::{CatalogService, Directory, StockService};
pub use db::OrderStore;
pub use orders::OrderEngine;
pub use tables::TableService;

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ______                                 __
  / ____/___  ____ ___  ____ _____  ____/ /___ _
 / /   / __ \/ __ `__ \/ __ `/ __ \/ __  / __ `/
/ /___/ /_/ / / / / / / /_/ / / / / /_/ / /_/ /
\____/\____/_/ /_/ /_/\__,_/_/ /_/\__,_/\__,_/
    "#
    );
}
