//! Catalog - shops, customers, items and the stock ledger
//!
//! The order engine never touches catalog tables directly. Existence checks
//! go through the [`Directory`] trait, stock mutation through
//! [`StockService`], which exposes a transaction-scoped withdraw so the
//! engine can decrement stock inside its own write transaction.

pub mod directory;
pub mod stock;

pub use directory::{CatalogService, Customer, Directory, Item, Shop};
pub use stock::{ItemStock, StockService};
