//! Input source trait definition.
//!
//! An input source answers one question: which buzzers are held down right
//! now? It is a sampled, level-triggered view of the panel. Edge detection,
//! arbitration and game rules all live above this boundary.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use quizbuzz_core::InputBits;

use crate::error::Result;
use crate::types::DeviceInfo;

/// Source of instantaneous buzzer states.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic parameters, or the enum wrapper
/// [`AnyInputSource`](crate::devices::AnyInputSource) where a concrete type
/// is needed (for example to spawn the polling task).
///
/// # Examples
///
/// ```no_run
/// use quizbuzz_hardware::traits::InputSource;
/// use quizbuzz_hardware::error::Result;
///
/// async fn anyone_pressed<S: InputSource>(source: &mut S) -> Result<bool> {
///     let bits = source.poll().await?;
///     Ok(bits.any())
/// }
/// ```
pub trait InputSource: Send + Sync {
    /// Read the current state of every input.
    ///
    /// Issues one bounded request to the device. The returned vector always
    /// has [`input_count`](Self::input_count) bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the device does not answer in time, answers
    /// with a malformed or exception frame, or is disconnected. See
    /// [`HardwareError::is_transient`](crate::HardwareError::is_transient).
    async fn poll(&mut self) -> Result<InputBits>;

    /// Number of discrete inputs this source reports.
    fn input_count(&self) -> usize;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
