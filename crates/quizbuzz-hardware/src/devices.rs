//! Enum wrapper for input source dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so `Box<dyn InputSource>` is not available. The enum below
//! gives the polling task one concrete, `Send` type regardless of which
//! source backs it.
//!
//! # Examples
//!
//! ```
//! use quizbuzz_hardware::devices::AnyInputSource;
//! use quizbuzz_hardware::mock::MockBuzzerPanel;
//!
//! let (panel, _handle) = MockBuzzerPanel::new(4);
//! let source = AnyInputSource::Mock(panel);
//! ```

#[cfg(feature = "hardware-serial")]
use crate::modbus::ModbusRtuInput;
use crate::mock::MockBuzzerPanel;
use crate::traits::InputSource;
use crate::{DeviceInfo, Result};
use quizbuzz_core::InputBits;

/// Enum wrapper for input source dispatch.
///
/// # Examples
///
/// ```
/// use quizbuzz_hardware::devices::AnyInputSource;
/// use quizbuzz_hardware::traits::InputSource;
/// use quizbuzz_hardware::mock::MockBuzzerPanel;
///
/// #[tokio::main]
/// async fn main() -> quizbuzz_hardware::Result<()> {
///     let (panel, handle) = MockBuzzerPanel::new(4);
///     let mut source = AnyInputSource::Mock(panel);
///
///     handle.press(0);
///     assert!(source.poll().await?.is_set(0));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyInputSource {
    /// Mock panel for development and testing.
    Mock(MockBuzzerPanel),

    /// Modbus RTU field controller on a serial port.
    #[cfg(feature = "hardware-serial")]
    Modbus(ModbusRtuInput),
}

impl InputSource for AnyInputSource {
    async fn poll(&mut self) -> Result<InputBits> {
        match self {
            Self::Mock(device) => device.poll().await,
            #[cfg(feature = "hardware-serial")]
            Self::Modbus(device) => device.poll().await,
        }
    }

    fn input_count(&self) -> usize {
        match self {
            Self::Mock(device) => device.input_count(),
            #[cfg(feature = "hardware-serial")]
            Self::Modbus(device) => device.input_count(),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            #[cfg(feature = "hardware-serial")]
            Self::Modbus(device) => device.get_info().await,
        }
    }
}

impl From<MockBuzzerPanel> for AnyInputSource {
    fn from(panel: MockBuzzerPanel) -> Self {
        Self::Mock(panel)
    }
}

#[cfg(feature = "hardware-serial")]
impl From<ModbusRtuInput> for AnyInputSource {
    fn from(reader: ModbusRtuInput) -> Self {
        Self::Modbus(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_source_dispatches_to_mock() {
        let (panel, handle) = MockBuzzerPanel::new(4);
        let mut source = AnyInputSource::from(panel);

        assert_eq!(source.input_count(), 4);

        handle.press(3);
        let bits = source.poll().await.unwrap();
        assert!(bits.is_set(3));

        let info = source.get_info().await.unwrap();
        assert_eq!(info.input_count, 4);
    }
}
