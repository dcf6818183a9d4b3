//! Stock ledger
//!
//! Stock is tracked per item as a quantity plus an `available` flag. The flag
//! is derived: it flips to `false` the moment quantity reaches zero and back
//! to `true` on any restock. [`StockService::withdraw_in`] runs inside a
//! caller-owned write transaction so a multi-line order either decrements
//! every line's stock or none of it.

use redb::WriteTransaction;
use serde::{Deserialize, Serialize};

use crate::db::OrderStore;
use shared::error::{AppError, AppResult};

/// Stock state of one item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemStock {
    /// Units on hand. Never negative.
    pub quantity: i64,
    /// False exactly while `quantity` is zero.
    pub available: bool,
}

/// Stock operations over the embedded store.
#[derive(Clone)]
pub struct StockService {
    store: OrderStore,
}

impl StockService {
    pub fn new(store: OrderStore) -> Self {
        Self { store }
    }

    /// Current stock of an item. `None` when the item has no stock record.
    pub fn stock_of(&self, item_id: i64) -> AppResult<Option<ItemStock>> {
        Ok(self.store.get_stock(item_id)?)
    }

    /// Set an item's stock to an absolute level.
    pub fn set_stock(&self, item_id: i64, quantity: i64) -> AppResult<ItemStock> {
        if quantity < 0 {
            return Err(AppError::validation("stock quantity must not be negative"));
        }
        let stock = ItemStock {
            quantity,
            available: quantity > 0,
        };

        let txn = self.store.begin_write()?;
        self.store.put_stock(&txn, item_id, &stock)?;
        self.store.commit(txn)?;

        tracing::debug!(item_id, quantity, "Stock level set");
        Ok(stock)
    }

    /// Add units to an item's stock.
    pub fn deposit(&self, item_id: i64, amount: i64) -> AppResult<ItemStock> {
        if amount <= 0 {
            return Err(AppError::validation("deposit amount must be positive"));
        }

        let txn = self.store.begin_write()?;
        let current = self
            .store
            .get_stock_txn(&txn, item_id)?
            .map(|s| s.quantity)
            .unwrap_or(0);
        let stock = ItemStock {
            quantity: current + amount,
            available: current + amount > 0,
        };
        self.store.put_stock(&txn, item_id, &stock)?;
        self.store.commit(txn)?;

        tracing::debug!(item_id, amount, quantity = stock.quantity, "Stock deposited");
        Ok(stock)
    }

    /// Withdraw units inside the caller's write transaction.
    ///
    /// Fails with an insufficient-stock error reporting the item, the
    /// requested quantity and the current level when the record is absent,
    /// exhausted, or smaller than the request. Reaching exactly zero marks
    /// the item unavailable.
    pub fn withdraw_in(
        &self,
        txn: &WriteTransaction,
        item_id: i64,
        quantity: i32,
    ) -> AppResult<ItemStock> {
        if quantity <= 0 {
            return Err(AppError::validation("withdraw quantity must be positive"));
        }

        let Some(stock) = self.store.get_stock_txn(txn, item_id)? else {
            return Err(AppError::insufficient_stock(item_id, quantity, 0));
        };
        if !stock.available || stock.quantity < i64::from(quantity) {
            return Err(AppError::insufficient_stock(
                item_id,
                quantity,
                stock.quantity,
            ));
        }

        let remaining = stock.quantity - i64::from(quantity);
        let next = ItemStock {
            quantity: remaining,
            available: remaining > 0,
        };
        self.store.put_stock(txn, item_id, &next)?;
        Ok(next)
    }
}
