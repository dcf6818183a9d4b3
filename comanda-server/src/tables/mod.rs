//! Table occupancy tracking
//!
//! Occupancy is presentation state derived from the order lifecycle: a table
//! becomes occupied when an order opens on it and free when that order
//! reaches a terminal state. [`TableService::set_occupied_in`] takes the
//! engine's write transaction so the flag always changes together with the
//! order rows.

use redb::WriteTransaction;
use serde::{Deserialize, Serialize};

use crate::db::OrderStore;
use shared::error::AppResult;
use shared::util::now_millis;

/// Occupancy state of one table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TableOccupancy {
    pub occupied: bool,
    /// Last change timestamp (Unix millis), set server-side.
    pub updated_at: i64,
}

/// Occupancy queries and transaction-scoped updates.
#[derive(Clone)]
pub struct TableService {
    store: OrderStore,
}

impl TableService {
    pub fn new(store: OrderStore) -> Self {
        Self { store }
    }

    /// Whether (shop, table) is currently occupied. Tables with no record
    /// yet are free.
    pub fn is_occupied(&self, shop_id: i64, table_id: i64) -> AppResult<bool> {
        Ok(self
            .store
            .get_occupancy(shop_id, table_id)?
            .map(|t| t.occupied)
            .unwrap_or(false))
    }

    /// Occupancy record of one table, if any state was ever written.
    pub fn occupancy_of(&self, shop_id: i64, table_id: i64) -> AppResult<Option<TableOccupancy>> {
        Ok(self.store.get_occupancy(shop_id, table_id)?)
    }

    /// Ids of the currently occupied tables of a shop, ascending.
    pub fn occupied_tables(&self, shop_id: i64) -> AppResult<Vec<i64>> {
        let all = self.store.get_shop_occupancy(shop_id)?;
        Ok(all
            .into_iter()
            .filter(|(_, state)| state.occupied)
            .map(|(table_id, _)| table_id)
            .collect())
    }

    /// Flip the occupancy flag inside the caller's write transaction.
    pub fn set_occupied_in(
        &self,
        txn: &WriteTransaction,
        shop_id: i64,
        table_id: i64,
        occupied: bool,
    ) -> AppResult<()> {
        self.store.set_occupancy(
            txn,
            shop_id,
            table_id,
            &TableOccupancy {
                occupied,
                updated_at: now_millis(),
            },
        )?;
        Ok(())
    }
}
