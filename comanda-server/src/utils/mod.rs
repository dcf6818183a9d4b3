//! Utility module: logging setup and input validation.

pub mod logger;
pub mod validation;

pub use validation::{validate_optional_text, validate_required_text};
