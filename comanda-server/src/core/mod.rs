//! Core module: server configuration and state
//!
//! # Structure
//!
//! - [`Config`]: environment-driven configuration
//! - [`ServerState`]: the wired service stack

pub mod config;
pub mod state;

pub use config::Config;
pub use state::ServerState;
