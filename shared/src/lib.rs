//! Shared types for the Comanda ordering backend
//!
//! Common types used across crates: the coded error system,
//! the order data model, and id/time utilities.

pub mod error;
pub mod order;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use order::{OrderLine, OrderLineRequest, OrderStatus, OrderView};
