//! Shared domain types for the quizbuzz buzzer quiz engine.
//!
//! This crate holds the vocabulary every other crate speaks: contestant
//! identifiers, the discrete-input bit vector read from the buzzer panel,
//! the question record presented to contestants, and the constants of the
//! reference deployment.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
