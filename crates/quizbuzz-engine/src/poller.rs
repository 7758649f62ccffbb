//! Background buzzer polling.
//!
//! The poller reads the input source on a fixed cadence in its own task and
//! hands at most one pending buzz to the engine through a single-slot
//! mailbox.
//!
//! # Architecture
//!
//! ```text
//!                 BuzzGate (watch)
//!        ┌──────────────────────────────┐
//!        ▼                              │
//! ┌─────────────┐   BuzzEvent    ┌──────┴───────────┐
//! │ Poll task   │──────────────►│ SessionController │
//! │ (interval)  │  mailbox (1)   │ (owns the engine) │
//! └─────────────┘                └──────────────────┘
//! ```
//!
//! The controller publishes a [`BuzzGate`] after every change: whether the
//! buzzers are armed, the round generation, and the round's lockouts. The
//! task skips the poll while the gate is closed and checks the gate again
//! after the poll returns, so a reading taken for a round that has since
//! moved on is dropped before it is sent. If a buzz is already waiting in
//! the mailbox, newer readings are dropped rather than queued. The engine
//! still checks the round generation on receipt.
//!
//! # Failures
//!
//! A transient read failure means "no reading this tick": it is logged at
//! debug level and the next tick polls again. A non-transient failure ends
//! the task, which closes the mailbox; the game carries on without buzzers.

use std::time::Duration;

use quizbuzz_core::InputBits;
use quizbuzz_hardware::{AnyInputSource, HardwareError, InputSource};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use crate::arbiter::BuzzArbiter;
use crate::config::GameConfig;

/// What the poll task needs to know about the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzGate {
    /// True while the engine would grant a floor.
    pub armed: bool,

    /// Round generation the gate was published for.
    pub round: u64,

    /// Contestants who may not buzz this round.
    pub lockouts: InputBits,
}

impl BuzzGate {
    /// A closed gate for a roster of `roster_size`.
    pub fn closed(roster_size: usize) -> Self {
        Self {
            armed: false,
            round: 0,
            lockouts: InputBits::empty(roster_size),
        }
    }
}

/// A buzzer reading with at least one eligible press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzEvent {
    pub bits: InputBits,

    /// Round generation the reading was taken in.
    pub round: u64,
}

/// Receiving end of the single-slot buzz mailbox.
///
/// `recv` returns `None` once the poll task has stopped.
#[derive(Debug)]
pub struct BuzzMailbox {
    rx: mpsc::Receiver<BuzzEvent>,
}

impl BuzzMailbox {
    pub async fn recv(&mut self) -> Option<BuzzEvent> {
        self.rx.recv().await
    }

    /// Take the pending buzz without waiting.
    pub fn try_recv(&mut self) -> Option<BuzzEvent> {
        self.rx.try_recv().ok()
    }
}

/// Handle to a running poll task.
pub struct BuzzPollerHandle {
    tasks: JoinSet<Result<(), HardwareError>>,
}

impl std::fmt::Debug for BuzzPollerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuzzPollerHandle")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl BuzzPollerHandle {
    /// Stop polling.
    ///
    /// The task is aborted at its next await point. A blocking transport
    /// call already in flight is not waited for; it completes on its own
    /// within the transport timeout.
    pub async fn shutdown(mut self) {
        self.tasks.abort_all();

        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(Ok(())) => debug!("buzz poller finished"),
                Ok(Err(e)) => warn!(error = %e, "buzz poller had stopped on error"),
                Err(e) if e.is_cancelled() => debug!("buzz poller cancelled"),
                Err(e) => error!(error = %e, "buzz poller panicked"),
            }
        }
    }
}

/// Polls an input source in the background.
///
/// # Examples
///
/// ```
/// use quizbuzz_core::InputBits;
/// use quizbuzz_engine::{BuzzGate, BuzzPoller, GameConfig};
/// use quizbuzz_hardware::mock::MockBuzzerPanel;
/// use tokio::sync::watch;
///
/// #[tokio::main]
/// async fn main() {
///     let (panel, buttons) = MockBuzzerPanel::new(4);
///     let (gate_tx, gate_rx) = watch::channel(BuzzGate {
///         armed: true,
///         round: 1,
///         lockouts: InputBits::empty(4),
///     });
///
///     let (handle, mut mailbox) =
///         BuzzPoller::new(panel.into(), gate_rx, &GameConfig::default()).start();
///
///     buttons.press(2);
///     let buzz = mailbox.recv().await.unwrap();
///     assert!(buzz.bits.is_set(2));
///     assert_eq!(buzz.round, 1);
///
///     handle.shutdown().await;
///     drop(gate_tx);
/// }
/// ```
#[derive(Debug)]
pub struct BuzzPoller {
    source: AnyInputSource,
    gate: watch::Receiver<BuzzGate>,
    interval: Duration,
    timeout: Duration,
}

impl BuzzPoller {
    pub fn new(source: AnyInputSource, gate: watch::Receiver<BuzzGate>, config: &GameConfig) -> Self {
        Self {
            source,
            gate,
            interval: config.poll_interval(),
            timeout: config.poll_timeout(),
        }
    }

    /// Spawn the poll task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> (BuzzPollerHandle, BuzzMailbox) {
        let (tx, rx) = mpsc::channel(1);
        let mut tasks = JoinSet::new();
        tasks.spawn(Self::poll_task(
            self.source,
            self.gate,
            tx,
            self.interval,
            self.timeout,
        ));

        (BuzzPollerHandle { tasks }, BuzzMailbox { rx })
    }

    async fn poll_task(
        mut source: AnyInputSource,
        gate: watch::Receiver<BuzzGate>,
        tx: mpsc::Sender<BuzzEvent>,
        interval: Duration,
        timeout: Duration,
    ) -> Result<(), HardwareError> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = interval.as_millis() as u64,
            inputs = source.input_count(),
            "buzz poller started"
        );

        loop {
            ticker.tick().await;

            // Controller gone.
            if gate.has_changed().is_err() || tx.is_closed() {
                return Ok(());
            }

            let polled_round = {
                let current = gate.borrow();
                if !current.armed {
                    continue;
                }
                current.round
            };

            let bits = match tokio::time::timeout(timeout, source.poll()).await {
                Ok(Ok(bits)) => bits,
                Ok(Err(e)) if e.is_transient() => {
                    debug!(error = %e, "no buzzer reading this tick");
                    continue;
                }
                Ok(Err(e)) => {
                    error!(error = %e, "input source unusable, buzz polling stopped");
                    return Err(e);
                }
                Err(_) => {
                    debug!(
                        timeout_ms = timeout.as_millis() as u64,
                        "buzzer poll timed out"
                    );
                    continue;
                }
            };

            let event = {
                let current = gate.borrow();
                if !current.armed || current.round != polled_round {
                    trace!(%bits, "round moved on during poll, reading dropped");
                    continue;
                }
                if BuzzArbiter::arbitrate(&bits, &current.lockouts).is_none() {
                    continue;
                }
                BuzzEvent {
                    bits,
                    round: polled_round,
                }
            };

            match tx.try_send(event) {
                Ok(()) => trace!(%bits, round = polled_round, "buzz posted"),
                Err(TrySendError::Full(_)) => {
                    trace!(%bits, "buzz already pending, reading dropped");
                }
                Err(TrySendError::Closed(_)) => return Ok(()),
            }
        }
    }
}
