//! Money handling using rust_decimal for precision
//!
//! Order totals are stored and serialized as `f64`. Every calculation runs
//! on `Decimal` internally and converts back through a 2-decimal half-up
//! rounding, so accumulated line totals never drift.

use rust_decimal::prelude::*;

use shared::error::{AppError, AppResult};
use shared::order::OrderLineRequest;

/// Rounding target for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed line total (1,000,000)
pub const MAX_TOTAL: f64 = 1_000_000.0;

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate an order-line request before processing
pub fn validate_line(line: &OrderLineRequest) -> AppResult<()> {
    require_finite(line.total, "total")?;
    if line.total < 0.0 {
        return Err(AppError::validation(format!(
            "total must be non-negative, got {}",
            line.total
        )));
    }
    if line.total > MAX_TOTAL {
        return Err(AppError::validation(format!(
            "total exceeds maximum allowed ({}), got {}",
            MAX_TOTAL, line.total
        )));
    }

    if line.quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {}",
            line.quantity
        )));
    }
    if line.quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, line.quantity
        )));
    }

    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a monetary value to 2 decimal places (ingest normalization)
#[inline]
pub fn round(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Sum monetary values with precise arithmetic
pub fn sum_totals(values: impl Iterator<Item = f64>) -> f64 {
    let total: Decimal = values.map(to_decimal).sum();
    to_f64(total)
}
