//! Common types shared across input source implementations.
//!
//! This module defines device information and the serial field-bus
//! configuration used by the Modbus RTU reader.

use quizbuzz_core::constants::{
    DEFAULT_BASE_ADDRESS, DEFAULT_BAUD_RATE, DEFAULT_POLL_TIMEOUT_MS, DEFAULT_ROSTER_SIZE,
    DEFAULT_SERIAL_PORT, DEFAULT_UNIT_ID, MAX_CONTESTANTS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{HardwareError, Result};

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "/dev/ttyUSB0", "Mock Buzzer Panel").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Number of discrete inputs the device reports.
    pub input_count: usize,
}

impl DeviceInfo {
    /// Create a new DeviceInfo.
    pub fn new(name: impl Into<String>, model: impl Into<String>, input_count: usize) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            input_count,
        }
    }
}

/// Serial parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Serial field-bus and device addressing configuration.
///
/// Every field has a default matching the reference deployment, so a
/// configuration file only needs to name what differs.
///
/// # Examples
///
/// ```
/// use quizbuzz_hardware::types::{Parity, SerialConfig};
///
/// let config = SerialConfig::new("/dev/ttyUSB1")
///     .baud_rate(19200)
///     .parity(Parity::Even);
///
/// assert_eq!(config.port, "/dev/ttyUSB1");
/// assert_eq!(config.input_count, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Path of the serial device.
    pub port: String,

    /// Line speed in bits per second.
    pub baud_rate: u32,

    /// Parity bit.
    pub parity: Parity,

    /// Data bits per character (5-8).
    pub data_bits: u8,

    /// Stop bits (1 or 2).
    pub stop_bits: u8,

    /// Read timeout for one request/response exchange, in milliseconds.
    pub timeout_ms: u64,

    /// Modbus unit address of the buzzer controller.
    pub unit_id: u8,

    /// Address of the first discrete input.
    pub base_address: u16,

    /// Number of discrete inputs to read (one per contestant).
    pub input_count: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
            data_bits: 8,
            stop_bits: 1,
            timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            unit_id: DEFAULT_UNIT_ID,
            base_address: DEFAULT_BASE_ADDRESS,
            input_count: DEFAULT_ROSTER_SIZE,
        }
    }
}

impl SerialConfig {
    /// Create a configuration for the given serial device.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Default::default()
        }
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = unit_id;
        self
    }

    pub fn base_address(mut self, base_address: u16) -> Self {
        self.base_address = base_address;
        self
    }

    pub fn input_count(mut self, input_count: usize) -> Self {
        self.input_count = input_count;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check the configuration before opening the port.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ConfigurationError` for values the serial
    /// layer or the Modbus protocol cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(HardwareError::configuration("serial port path is empty"));
        }
        if self.baud_rate == 0 {
            return Err(HardwareError::configuration("baud rate must be positive"));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(HardwareError::configuration(format!(
                "data bits must be 5-8, got {}",
                self.data_bits
            )));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return Err(HardwareError::configuration(format!(
                "stop bits must be 1 or 2, got {}",
                self.stop_bits
            )));
        }
        if self.unit_id == 0 || self.unit_id > 247 {
            return Err(HardwareError::configuration(format!(
                "unit id must be 1-247, got {}",
                self.unit_id
            )));
        }
        if self.input_count == 0 || self.input_count > MAX_CONTESTANTS {
            return Err(HardwareError::configuration(format!(
                "input count must be 1-{MAX_CONTESTANTS}, got {}",
                self.input_count
            )));
        }
        if usize::from(self.base_address) + self.input_count > usize::from(u16::MAX) + 1 {
            return Err(HardwareError::configuration(
                "input range runs past the last Modbus address",
            ));
        }
        if self.timeout_ms == 0 {
            return Err(HardwareError::configuration("timeout must be positive"));
        }
        Ok(())
    }
}
