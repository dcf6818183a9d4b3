//! Order line types and lifecycle states

use serde::{Deserialize, Serialize};

// ============================================================================
// Order Status
// ============================================================================

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order is open; its table stays occupied
    #[default]
    Open,
    /// Order was completed
    Closed,
    /// Order was cancelled
    Cancelled,
}

impl OrderStatus {
    /// Whether the status is terminal (no further lifecycle changes)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Closed | OrderStatus::Cancelled)
    }

    /// Whether a transition from `self` to `target` is allowed.
    ///
    /// Open orders may move to either terminal state. Re-applying the
    /// same terminal state is allowed (closing a closed order refreshes
    /// its update timestamp); crossing from one terminal state to the
    /// other is not.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        match (self, target) {
            (OrderStatus::Open, OrderStatus::Closed) => true,
            (OrderStatus::Open, OrderStatus::Cancelled) => true,
            (a, b) => *a == b && a.is_terminal(),
        }
    }
}

// ============================================================================
// Order Lines
// ============================================================================

/// A single requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineRequest {
    /// Shop the order is placed in
    pub shop_id: i64,
    /// Customer placing the order
    pub customer_id: i64,
    /// Ordered item
    pub item_id: i64,
    /// Requested quantity (must be positive)
    pub quantity: i32,
    /// Target table (1-based index within the shop)
    pub table_id: i64,
    /// Line total
    pub total: f64,
    /// Optional line note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A persisted order line
///
/// Each line is one item of an order. Lines created by the same request
/// share a `group_id` and are folded back into one aggregated view on
/// every read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Line ID (assigned by server)
    pub id: i64,
    /// Group ID shared by all lines of one order (UUID v4)
    pub group_id: String,
    /// Shop the order belongs to
    pub shop_id: i64,
    /// Customer who placed the order
    pub customer_id: i64,
    /// Ordered item
    pub item_id: i64,
    /// Quantity
    pub quantity: i32,
    /// Table the order occupies
    pub table_id: i64,
    /// Line status
    pub status: OrderStatus,
    /// Line total
    pub total: f64,
    /// Optional note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Creation timestamp (millis)
    pub created_at: i64,
    /// Last update timestamp (millis)
    pub updated_at: i64,
}
