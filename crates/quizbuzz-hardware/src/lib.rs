//! Buzzer input layer for the quizbuzz quiz engine.
//!
//! This crate reads the instantaneous press/release state of the buzzer
//! panel. It knows nothing about rounds or scoring: it only turns a
//! request/response exchange with a field device into an
//! [`InputBits`](quizbuzz_core::InputBits) vector, or an error saying why
//! there is no reading this time.
//!
//! # Design Philosophy
//!
//! - **Async-first**: polling uses native `async fn` in traits (Rust 1.90 +
//!   Edition 2024 RPITIT).
//! - **Enum dispatch**: [`AnyInputSource`] gives the polling task a concrete
//!   type for every backend.
//! - **Errors are classified**: [`HardwareError::is_transient`] separates
//!   "try again next tick" from "this device cannot be used".
//!
//! # Sources
//!
//! - [`modbus::ModbusRtuInput`] reads discrete inputs from a Modbus RTU
//!   controller over `serialport` (feature `hardware-serial`, on by default).
//! - [`mock::MockBuzzerPanel`] is driven from code, for tests and for
//!   running a game from the keyboard.
//!
//! ```no_run
//! use quizbuzz_hardware::traits::InputSource;
//! use quizbuzz_hardware::mock::MockBuzzerPanel;
//!
//! # async fn example() -> quizbuzz_hardware::Result<()> {
//! let (mut panel, handle) = MockBuzzerPanel::new(4);
//! handle.press(1);
//!
//! match panel.poll().await {
//!     Ok(bits) => println!("held: {bits}"),
//!     Err(e) if e.is_transient() => {} // no information this tick
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod devices;
pub mod error;
pub mod mock;
pub mod modbus;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::AnyInputSource;
pub use error::{HardwareError, Result};
pub use traits::InputSource;
pub use types::{DeviceInfo, Parity, SerialConfig};
