//! Constants of the reference buzzer deployment.
//!
//! The reference installation is a four-buzzer panel wired to the discrete
//! inputs of a small PLC, read over Modbus RTU on a USB serial adapter. The
//! values below describe that installation and serve as defaults for every
//! configuration struct in the workspace.
//!
//! # Usage
//!
//! ```
//! use quizbuzz_core::constants::*;
//!
//! assert_eq!(DEFAULT_ROSTER_SIZE, 4);
//! assert!(POINTS_AFTER_WRONG_ANSWER < POINTS_FIRST_ATTEMPT);
//!
//! use std::time::Duration;
//! let cadence = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
//! assert_eq!(cadence.as_millis(), 100);
//! ```

// ============================================================================
// Roster
// ============================================================================

/// Number of contestants in the reference deployment.
pub const DEFAULT_ROSTER_SIZE: usize = 4;

/// Largest roster an [`InputBits`](crate::InputBits) vector can describe.
pub const MAX_CONTESTANTS: usize = 32;

// ============================================================================
// Questions
// ============================================================================

/// Number of answer slots stored per question record.
pub const MAX_OPTIONS: usize = 4;

/// Minimum number of records a question store must hold.
///
/// Stores with fewer records are treated as malformed and replaced by a
/// generated default bank of exactly this many questions.
pub const MIN_BANK_LENGTH: usize = 13;

// ============================================================================
// Scoring
// ============================================================================

/// Points for a correct answer when nobody has been locked out this round.
pub const POINTS_FIRST_ATTEMPT: u32 = 100;

/// Points for a correct answer after at least one wrong answer this round.
///
/// This is a flat second tier: any number of prior wrong answers yields
/// the same reward.
pub const POINTS_AFTER_WRONG_ANSWER: u32 = 50;

// ============================================================================
// Polling
// ============================================================================

/// Interval between two discrete-input reads, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Upper bound on a single discrete-input read, in milliseconds.
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 500;

// ============================================================================
// Field bus
// ============================================================================

/// Serial device of the USB RS-485 adapter.
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Baud rate of the field bus.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Modbus unit (slave) address of the buzzer PLC.
pub const DEFAULT_UNIT_ID: u8 = 1;

/// First discrete input wired to a buzzer.
pub const DEFAULT_BASE_ADDRESS: u16 = 10;
