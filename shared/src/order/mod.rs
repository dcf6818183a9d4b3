//! Order Data Model
//!
//! This module provides the types shared by the order lifecycle engine:
//! - Requests: per-line input submitted by clients
//! - Lines: persisted per-item rows sharing a group id
//! - Views: aggregated read models folded from stored lines

pub mod types;
pub mod view;

// Re-exports
pub use types::{OrderLine, OrderLineRequest, OrderStatus};
pub use view::{OrderItemView, OrderView};
