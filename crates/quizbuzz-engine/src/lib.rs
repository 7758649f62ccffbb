//! Buzz arbitration and round logic for the quizbuzz quiz engine.
//!
//! This crate turns buzzer readings into an exclusive right to answer, runs
//! each question as a round, keeps the scores, and exposes the command
//! surface a presentation layer drives.
//!
//! # Components
//!
//! - [`BuzzArbiter`]: picks the lowest-numbered eligible contestant from a
//!   buzzer snapshot.
//! - [`RoundStateMachine`]: the transition table of a round.
//! - [`RoundEngine`]: owns scores, lockouts and the question cursor; every
//!   input is accepted or ignored, never failed.
//! - [`SessionController`]: session start and reset, the command surface,
//!   snapshot and event publication.
//! - [`BuzzPoller`]: background polling with a single-slot buzz mailbox.
//!
//! # Concurrency
//!
//! All session state lives in the [`RoundEngine`] inside one
//! [`SessionController`], which is driven from a single task. The only
//! state shared with another task is the [`BuzzGate`] the controller
//! publishes and the one-slot mailbox the poller writes to.

pub mod arbiter;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod poller;
pub mod session;
pub mod state;

pub use arbiter::BuzzArbiter;
pub use config::{AdvancePolicy, GameConfig};
pub use engine::{Disposition, IgnoreReason, RoundEngine};
pub use error::{CommandError, CommandResult};
pub use events::{ContestantStatus, GameReport, SessionEvent, SessionSnapshot};
pub use poller::{BuzzEvent, BuzzGate, BuzzMailbox, BuzzPoller, BuzzPollerHandle};
pub use session::{CommandReply, SessionController};
pub use state::{InvalidTransition, RoundOutcome, RoundState, RoundStateMachine, RoundTransition};
