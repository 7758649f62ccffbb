//! Error types for hardware operations.
//!
//! Errors fall into two classes. Transient errors (timeouts, garbled or
//! exception frames, a momentarily unplugged adapter) mean "no new
//! information this tick" and are retried on the next poll. Configuration
//! errors mean the device cannot be used at all; they disable the hardware
//! feature but never the game.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device (bad CRC, wrong length, wrong unit).
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// The field device answered with a Modbus exception.
    #[error("Device exception 0x{code:02X} for function 0x{function:02X}")]
    ExceptionResponse { function: u8, code: u8 },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new exception response error.
    pub fn exception(function: u8, code: u8) -> Self {
        Self::ExceptionResponse { function, code }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// True if the failure only means "no reading this time".
    ///
    /// Callers must treat a transient failure as absence of information,
    /// never as a release of every input.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            Self::InitializationFailed { .. } | Self::ConfigurationError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("/dev/ttyUSB0");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: /dev/ttyUSB0");
    }

    #[test]
    fn test_timeout_error() {
        let error = HardwareError::timeout(500);
        assert!(matches!(error, HardwareError::Timeout { .. }));
        assert_eq!(error.to_string(), "Operation timeout after 500ms");
    }

    #[test]
    fn test_exception_error() {
        let error = HardwareError::exception(0x82, 0x02);
        assert_eq!(error.to_string(), "Device exception 0x02 for function 0x82");
    }

    #[test]
    fn test_invalid_data_error() {
        let error = HardwareError::invalid_data("CRC mismatch");
        assert_eq!(error.to_string(), "Invalid data: CRC mismatch");
    }

    #[test]
    fn test_transient_classification() {
        assert!(HardwareError::timeout(500).is_transient());
        assert!(HardwareError::disconnected("bus").is_transient());
        assert!(HardwareError::invalid_data("short frame").is_transient());
        assert!(HardwareError::exception(0x82, 0x04).is_transient());
        assert!(HardwareError::communication("busy").is_transient());
        assert!(
            HardwareError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
                .is_transient()
        );

        assert!(!HardwareError::configuration("bad parity").is_transient());
        assert!(!HardwareError::initialization_failed("no such port").is_transient());
    }
}
