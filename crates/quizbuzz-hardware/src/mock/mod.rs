//! Mock device implementations for testing and development.
//!
//! This module provides a simulated buzzer panel that can be controlled
//! programmatically without requiring physical hardware.

pub mod buzzer;

// Re-export commonly used types
pub use buzzer::{MockBuzzerHandle, MockBuzzerPanel, MockFault};
