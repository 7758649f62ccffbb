//! Modbus RTU discrete-input reader.
//!
//! The buzzer panel is wired to discrete inputs of a field controller on a
//! serial RS-485 link. Each [`poll`](crate::traits::InputSource::poll) sends
//! one read-discrete-inputs request and waits for the reply, bounded by the
//! serial timeout.
//!
//! The blocking serial exchange runs on Tokio's blocking pool. If the task
//! awaiting it is aborted (session reset or shutdown), the exchange finishes
//! on its own within the port timeout and nobody waits for it.

pub mod frame;

#[cfg(feature = "hardware-serial")]
pub use serial::ModbusRtuInput;

#[cfg(feature = "hardware-serial")]
mod serial {
    use std::io::{Read, Write};
    use std::sync::{Arc, Mutex, TryLockError};

    use quizbuzz_core::InputBits;
    use serialport::{ClearBuffer, DataBits, SerialPort, StopBits};
    use tracing::{debug, info, trace};

    use super::frame;
    use crate::error::{HardwareError, Result};
    use crate::traits::InputSource;
    use crate::types::{DeviceInfo, Parity, SerialConfig};

    /// Reader for the buzzer inputs of a Modbus RTU field controller.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quizbuzz_hardware::modbus::ModbusRtuInput;
    /// use quizbuzz_hardware::traits::InputSource;
    /// use quizbuzz_hardware::types::SerialConfig;
    ///
    /// # async fn example() -> quizbuzz_hardware::Result<()> {
    /// let mut reader = ModbusRtuInput::open(SerialConfig::new("/dev/ttyUSB0"))?;
    /// let bits = reader.poll().await?;
    /// println!("inputs: {bits}");
    /// # Ok(())
    /// # }
    /// ```
    pub struct ModbusRtuInput {
        port: Arc<Mutex<Box<dyn SerialPort>>>,
        config: SerialConfig,
        request: [u8; 8],
    }

    impl std::fmt::Debug for ModbusRtuInput {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ModbusRtuInput")
                .field("config", &self.config)
                .finish_non_exhaustive()
        }
    }

    impl ModbusRtuInput {
        /// Open the serial port described by `config`.
        ///
        /// # Errors
        ///
        /// Returns `ConfigurationError` for an invalid configuration and
        /// `InitializationFailed` if the port cannot be opened. Both are
        /// non-transient: the caller should run without hardware.
        pub fn open(config: SerialConfig) -> Result<Self> {
            config.validate()?;

            let count = u16::try_from(config.input_count)
                .map_err(|_| HardwareError::configuration("input count does not fit a request"))?;
            let request =
                frame::encode_read_discrete_inputs(config.unit_id, config.base_address, count)?;

            let port = serialport::new(&config.port, config.baud_rate)
                .parity(match config.parity {
                    Parity::None => serialport::Parity::None,
                    Parity::Even => serialport::Parity::Even,
                    Parity::Odd => serialport::Parity::Odd,
                })
                .data_bits(match config.data_bits {
                    5 => DataBits::Five,
                    6 => DataBits::Six,
                    7 => DataBits::Seven,
                    _ => DataBits::Eight,
                })
                .stop_bits(if config.stop_bits == 2 {
                    StopBits::Two
                } else {
                    StopBits::One
                })
                .timeout(config.timeout())
                .open()
                .map_err(|e| {
                    HardwareError::initialization_failed(format!("{}: {e}", config.port))
                })?;

            info!(
                port = %config.port,
                baud = config.baud_rate,
                unit = config.unit_id,
                base = config.base_address,
                inputs = config.input_count,
                "opened Modbus RTU buzzer link"
            );

            Ok(Self {
                port: Arc::new(Mutex::new(port)),
                config,
                request,
            })
        }

        /// Configuration the port was opened with.
        pub fn config(&self) -> &SerialConfig {
            &self.config
        }

        fn exchange(
            port: &mut dyn SerialPort,
            request: &[u8; 8],
            unit: u8,
            count: u16,
            timeout_ms: u64,
        ) -> Result<InputBits> {
            // Stale bytes from an abandoned exchange would desynchronise framing.
            let _ = port.clear(ClearBuffer::Input);

            port.write_all(request).map_err(|e| map_io(e, timeout_ms))?;
            trace!(request = ?request, "sent read-discrete-inputs");

            let mut header = [0u8; frame::RESPONSE_HEADER_LEN];
            port.read_exact(&mut header)
                .map_err(|e| map_io(e, timeout_ms))?;

            let total = if frame::is_exception_header(&header) {
                frame::EXCEPTION_FRAME_LEN
            } else {
                frame::RESPONSE_HEADER_LEN + usize::from(header[2]) + 2
            };

            let mut response = Vec::with_capacity(total);
            response.extend_from_slice(&header);
            response.resize(total, 0);
            port.read_exact(&mut response[frame::RESPONSE_HEADER_LEN..])
                .map_err(|e| map_io(e, timeout_ms))?;
            trace!(response = ?response, "received response");

            frame::decode_read_discrete_inputs(&response, unit, count)
        }
    }

    fn map_io(e: std::io::Error, timeout_ms: u64) -> HardwareError {
        match e.kind() {
            std::io::ErrorKind::TimedOut => HardwareError::timeout(timeout_ms),
            std::io::ErrorKind::NotFound | std::io::ErrorKind::BrokenPipe => {
                HardwareError::disconnected(e.to_string())
            }
            _ => HardwareError::Io(e),
        }
    }

    impl InputSource for ModbusRtuInput {
        async fn poll(&mut self) -> Result<InputBits> {
            let port = Arc::clone(&self.port);
            let request = self.request;
            let unit = self.config.unit_id;
            let count = self.config.input_count as u16;
            let timeout_ms = self.config.timeout_ms;

            tokio::task::spawn_blocking(move || {
                let mut guard = match port.try_lock() {
                    Ok(guard) => guard,
                    Err(TryLockError::WouldBlock) => {
                        debug!("previous exchange still in flight");
                        return Err(HardwareError::communication(
                            "serial port busy with an abandoned request",
                        ));
                    }
                    Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                };
                Self::exchange(&mut **guard, &request, unit, count, timeout_ms)
            })
            .await
            .map_err(|e| HardwareError::other(format!("serial exchange task failed: {e}")))?
        }

        fn input_count(&self) -> usize {
            self.config.input_count
        }

        async fn get_info(&self) -> Result<DeviceInfo> {
            Ok(DeviceInfo::new(
                self.config.port.clone(),
                format!("Modbus RTU unit {}", self.config.unit_id),
                self.config.input_count,
            ))
        }
    }
}
