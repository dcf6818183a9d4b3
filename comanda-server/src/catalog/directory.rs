//! Catalog directory - shop, customer and item records with lookups
//!
//! [`CatalogService`] is the concrete directory over the store's catalog
//! tables. Callers that only need existence checks depend on the
//! [`Directory`] trait instead, which keeps the engine testable against a
//! stub catalog.

use serde::{Deserialize, Serialize};

use crate::db::OrderStore;
use crate::utils::validation::{validate_required_text, MAX_NAME_LEN};
use shared::error::{AppError, AppResult};
use shared::util::now_millis;

// =============================================================================
// Records
// =============================================================================

/// A shop (tenant). `table_count` bounds the valid table indices: table ids
/// are 1-based, so `1..=table_count` are addressable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub name: String,
    pub table_count: i64,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

/// A menu item. The catalog price is informational; order lines carry their
/// own totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub shop_id: i64,
    pub name: String,
    pub price: f64,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

// =============================================================================
// Directory trait
// =============================================================================

/// Existence oracle over the catalog.
///
/// `Ok(None)` means the record does not exist; `Err` is reserved for storage
/// faults.
pub trait Directory: Send + Sync {
    fn find_shop(&self, shop_id: i64) -> AppResult<Option<Shop>>;
    fn find_customer(&self, customer_id: i64) -> AppResult<Option<Customer>>;
    fn find_item(&self, item_id: i64) -> AppResult<Option<Item>>;
}

// =============================================================================
// CatalogService
// =============================================================================

/// Concrete directory backed by the embedded store.
///
/// Registration is an upsert: seeding the same id twice overwrites the
/// record, which keeps fixtures idempotent.
#[derive(Clone)]
pub struct CatalogService {
    store: OrderStore,
}

impl CatalogService {
    pub fn new(store: OrderStore) -> Self {
        Self { store }
    }

    /// Register a shop with the given number of tables.
    pub fn register_shop(&self, id: i64, name: &str, table_count: i64) -> AppResult<Shop> {
        validate_required_text(name, "shop name", MAX_NAME_LEN)?;
        if table_count < 0 {
            return Err(AppError::validation("table_count must not be negative"));
        }

        let shop = Shop {
            id,
            name: name.to_string(),
            table_count,
            created_at: now_millis(),
        };

        let txn = self.store.begin_write()?;
        self.store.put_shop(&txn, &shop)?;
        self.store.commit(txn)?;

        tracing::info!(shop_id = id, name = %shop.name, table_count, "Shop registered");
        Ok(shop)
    }

    /// Register a customer.
    pub fn register_customer(&self, id: i64, name: &str) -> AppResult<Customer> {
        validate_required_text(name, "customer name", MAX_NAME_LEN)?;

        let customer = Customer {
            id,
            name: name.to_string(),
            created_at: now_millis(),
        };

        let txn = self.store.begin_write()?;
        self.store.put_customer(&txn, &customer)?;
        self.store.commit(txn)?;

        tracing::info!(customer_id = id, name = %customer.name, "Customer registered");
        Ok(customer)
    }

    /// Register an item and seed its stock level in the same transaction.
    pub fn register_item(
        &self,
        id: i64,
        shop_id: i64,
        name: &str,
        price: f64,
        initial_stock: i64,
    ) -> AppResult<Item> {
        validate_required_text(name, "item name", MAX_NAME_LEN)?;
        if initial_stock < 0 {
            return Err(AppError::validation("initial_stock must not be negative"));
        }

        let item = Item {
            id,
            shop_id,
            name: name.to_string(),
            price,
            created_at: now_millis(),
        };

        let txn = self.store.begin_write()?;
        self.store.put_item(&txn, &item)?;
        self.store.put_stock(
            &txn,
            id,
            &super::ItemStock {
                quantity: initial_stock,
                available: initial_stock > 0,
            },
        )?;
        self.store.commit(txn)?;

        tracing::info!(item_id = id, shop_id, name = %item.name, initial_stock, "Item registered");
        Ok(item)
    }
}

impl Directory for CatalogService {
    fn find_shop(&self, shop_id: i64) -> AppResult<Option<Shop>> {
        Ok(self.store.get_shop(shop_id)?)
    }

    fn find_customer(&self, customer_id: i64) -> AppResult<Option<Customer>> {
        Ok(self.store.get_customer(customer_id)?)
    }

    fn find_item(&self, item_id: i64) -> AppResult<Option<Item>> {
        Ok(self.store.get_item(item_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    fn create_test_catalog() -> CatalogService {
        CatalogService::new(OrderStore::open_in_memory().unwrap())
    }

    #[test]
    fn test_register_and_find() {
        let catalog = create_test_catalog();

        catalog.register_shop(1, "Trattoria", 8).unwrap();
        catalog.register_customer(2, "Walk-in").unwrap();
        catalog.register_item(3, 1, "Paella", 18.5, 10).unwrap();

        let shop = catalog.find_shop(1).unwrap().unwrap();
        assert_eq!(shop.name, "Trattoria");
        assert_eq!(shop.table_count, 8);

        assert!(catalog.find_customer(2).unwrap().is_some());
        let item = catalog.find_item(3).unwrap().unwrap();
        assert_eq!(item.shop_id, 1);
        assert_eq!(item.price, 18.5);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let catalog = create_test_catalog();

        assert!(catalog.find_shop(99).unwrap().is_none());
        assert!(catalog.find_customer(99).unwrap().is_none());
        assert!(catalog.find_item(99).unwrap().is_none());
    }

    #[test]
    fn test_register_is_upsert() {
        let catalog = create_test_catalog();

        catalog.register_shop(1, "Old Name", 4).unwrap();
        catalog.register_shop(1, "New Name", 6).unwrap();

        let shop = catalog.find_shop(1).unwrap().unwrap();
        assert_eq!(shop.name, "New Name");
        assert_eq!(shop.table_count, 6);
    }

    #[test]
    fn test_register_item_seeds_stock() {
        let catalog = create_test_catalog();
        let store = catalog.store.clone();

        catalog.register_item(3, 1, "Paella", 18.5, 5).unwrap();

        let stock = store.get_stock(3).unwrap().unwrap();
        assert_eq!(stock.quantity, 5);
        assert!(stock.available);

        catalog.register_item(4, 1, "Off menu", 9.0, 0).unwrap();
        let stock = store.get_stock(4).unwrap().unwrap();
        assert_eq!(stock.quantity, 0);
        assert!(!stock.available);
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let catalog = create_test_catalog();

        let err = catalog.register_shop(1, "  ", 4).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = catalog.register_shop(1, "Shop", -1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = catalog.register_item(3, 1, "Item", 1.0, -5).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let long_name = "x".repeat(MAX_NAME_LEN + 1);
        let err = catalog.register_customer(2, &long_name).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
