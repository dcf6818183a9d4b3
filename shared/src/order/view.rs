//! Aggregated order view - folded from stored lines
//!
//! Orders are persisted one line per item; every read path folds the
//! lines sharing a group id back into a single [`OrderView`]. The fold
//! itself lives in the server crate, this module only defines the
//! resulting shape.

use super::types::OrderStatus;
use serde::{Deserialize, Serialize};

/// One item entry of an aggregated order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemView {
    /// Ordered item
    pub item_id: i64,
    /// Quantity
    pub quantity: i32,
    /// Line total for this item
    pub total: f64,
}

/// Aggregated order - one entry per group id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderView {
    /// Line ID of the most recent line
    pub id: i64,
    /// Group ID shared by all folded lines (UUID v4)
    pub group_id: String,
    /// Shop the order belongs to
    pub shop_id: i64,
    /// Customer who placed the order
    pub customer_id: i64,
    /// Table the order occupies
    pub table_id: i64,
    /// Order status
    pub status: OrderStatus,
    /// Note of the most recent line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Creation timestamp (millis)
    pub created_at: i64,
    /// Last update timestamp (millis)
    pub updated_at: i64,
    /// One entry per folded line
    pub items: Vec<OrderItemView>,
    /// Sum of all item totals
    pub total: f64,
}

impl OrderView {
    /// Check if the order is still open
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Total quantity across all items
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
