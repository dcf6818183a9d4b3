//! Order domain: lifecycle engine, aggregate folding and money rules.
//!
//! - [`engine`]: create / read / complete / cancel operations
//! - [`formatter`]: folds stored lines into one [`shared::order::OrderView`]
//! - [`money`]: decimal-backed arithmetic and ingest bounds

pub mod engine;
pub mod formatter;
pub mod money;

pub use engine::OrderEngine;

#[cfg(test)]
mod tests;
