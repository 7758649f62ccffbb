//! Session control: the command surface of the quiz engine.
//!
//! [`SessionController`] owns the [`RoundEngine`] and the question bank,
//! and is the only way a presentation layer changes the game. Each command
//! returns the resulting [`SessionSnapshot`] and publishes it, together
//! with the [`SessionEvent`]s it caused, to any number of observers.
//!
//! # Driving the buzzers
//!
//! Two scheduling models are supported, with the same observable behaviour:
//!
//! - **Cooperative**: call [`poll_tick`](SessionController::poll_tick) from
//!   a timer on the task that owns the controller. Each tick performs at
//!   most one poll, bounded by the configured poll timeout.
//! - **Background**: [`attach_poller`](SessionController::attach_poller)
//!   starts a [`BuzzPoller`] task and returns its [`BuzzMailbox`]; feed
//!   every buzz it yields to [`handle_buzz`](SessionController::handle_buzz).
//!
//! # Examples
//!
//! ```
//! use quizbuzz_core::ContestantId;
//! use quizbuzz_engine::{GameConfig, RoundState, SessionController};
//! use quizbuzz_hardware::mock::MockBuzzerPanel;
//! use quizbuzz_storage::{MemoryStore, QuestionBank, QuestionRecord, default_records};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut records = default_records();
//! records[0] = QuestionRecord::new("Largest ocean?", ["Atlantic", "Pacific", "", ""], 1);
//! let bank = QuestionBank::new(MemoryStore::with_records(records));
//!
//! let mut controller = SessionController::new(bank, GameConfig::default())?;
//! controller.start_session().await?;
//!
//! let (mut panel, buttons) = MockBuzzerPanel::new(4);
//! buttons.press(3);
//! let reply = controller.poll_tick(&mut panel).await?;
//! let p4 = ContestantId::new(3, 4)?;
//! assert_eq!(reply.snapshot.state, RoundState::AwaitingAnswer(p4));
//!
//! let reply = controller.submit_answer(p4, 1)?;
//! assert_eq!(reply.snapshot.score(3), 100);
//! assert!(reply.snapshot.finished);
//! # Ok(())
//! # }
//! ```

use quizbuzz_core::{ContestantId, Question};
use quizbuzz_hardware::{AnyInputSource, InputSource};
use quizbuzz_storage::{QuestionBank, QuestionStore};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::engine::{Disposition, IgnoreReason, RoundEngine};
use crate::error::{CommandError, CommandResult};
use crate::events::{SessionEvent, SessionSnapshot};
use crate::poller::{BuzzEvent, BuzzGate, BuzzMailbox, BuzzPoller, BuzzPollerHandle};

/// Capacity of the event broadcast; slow observers miss older events.
const EVENT_CAPACITY: usize = 64;

/// What a command did and the state it left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub disposition: Disposition,
    pub snapshot: SessionSnapshot,
}

impl CommandReply {
    pub fn is_accepted(&self) -> bool {
        self.disposition.is_accepted()
    }
}

/// Owner of the game session and its command surface.
pub struct SessionController<S> {
    bank: QuestionBank<S>,
    engine: RoundEngine,
    events: broadcast::Sender<SessionEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
    gate: watch::Sender<BuzzGate>,
    poller: Option<BuzzPollerHandle>,
    shut_down: bool,
}

impl<S> std::fmt::Debug for SessionController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("engine", &self.engine)
            .field("poller", &self.poller)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

impl<S: QuestionStore> SessionController<S> {
    /// Create a controller with no session running.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(bank: QuestionBank<S>, config: GameConfig) -> quizbuzz_core::Result<Self> {
        let roster_size = config.roster_size;
        let engine = RoundEngine::new(config)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (snapshots, _) = watch::channel(SessionSnapshot::idle(roster_size));
        let (gate, _) = watch::channel(BuzzGate::closed(roster_size));

        Ok(Self {
            bank,
            engine,
            events,
            snapshots,
            gate,
            poller: None,
            shut_down: false,
        })
    }

    pub fn bank(&self) -> &QuestionBank<S> {
        &self.bank
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to session events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Watch the published snapshots.
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Watch the buzz gate, for a custom polling loop.
    pub fn gate(&self) -> watch::Receiver<BuzzGate> {
        self.gate.subscribe()
    }

    /// Start a new session on the bank's enabled questions.
    ///
    /// The questions are read once here. Edits made to the bank while the
    /// session runs are not seen until the next start.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoEnabledQuestions` if no enabled question has
    /// text, leaving any running session untouched, or
    /// `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub async fn start_session(&mut self) -> CommandResult<CommandReply> {
        self.ensure_running()?;

        let questions = self.bank.load_enabled().await;
        if questions.iter().all(Question::is_placeholder) {
            warn!("no enabled questions, session not started");
            return Err(CommandError::NoEnabledQuestions);
        }

        let disposition = self.engine.start(questions);
        Ok(self.publish(disposition))
    }

    /// Answer on behalf of `contestant`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn submit_answer(
        &mut self,
        contestant: ContestantId,
        option: usize,
    ) -> CommandResult<CommandReply> {
        self.ensure_running()?;
        let disposition = self.engine.submit_answer(contestant, option);
        Ok(self.publish(disposition))
    }

    /// Resolve a host-adjudicated round in favour of `contestant`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn declare_manual_winner(
        &mut self,
        contestant: ContestantId,
    ) -> CommandResult<CommandReply> {
        self.ensure_running()?;
        let disposition = self.engine.declare_manual_winner(contestant);
        Ok(self.publish(disposition))
    }

    /// Move past a resolved round.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn advance(&mut self) -> CommandResult<CommandReply> {
        self.ensure_running()?;
        let disposition = self.engine.advance();
        Ok(self.publish(disposition))
    }

    /// Discard the running session.
    ///
    /// Buzzers are disarmed; a background poller stays attached and idles
    /// until the next session.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn reset_session(&mut self) -> CommandResult<CommandReply> {
        self.ensure_running()?;
        let disposition = self.engine.reset();
        Ok(self.publish(disposition))
    }

    /// Clear the floor and lockouts of the current round.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn reset_round(&mut self) -> CommandResult<CommandReply> {
        self.ensure_running()?;
        let disposition = self.engine.reset_round();
        Ok(self.publish(disposition))
    }

    /// Apply a buzz delivered by the background poller.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub fn handle_buzz(&mut self, event: BuzzEvent) -> CommandResult<CommandReply> {
        self.ensure_running()?;
        let disposition = self.engine.on_buzz(event.bits, event.round);
        Ok(self.publish(disposition))
    }

    /// Poll `source` once and apply the reading.
    ///
    /// Nothing is read unless the buzzers are armed. A poll that fails or
    /// outlasts the configured timeout leaves the session unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub async fn poll_tick<I: InputSource>(
        &mut self,
        source: &mut I,
    ) -> CommandResult<CommandReply> {
        self.ensure_running()?;

        if !self.engine.state().accepts_buzzes() {
            let reason = if !self.engine.is_started() {
                IgnoreReason::NoSession
            } else if self.engine.is_finished() {
                IgnoreReason::Finished
            } else {
                IgnoreReason::NotAcceptingBuzzes
            };
            return Ok(self.reply(Disposition::Ignored(reason)));
        }

        let round = self.engine.round();
        let timeout = self.engine.config().poll_timeout();
        let disposition = match tokio::time::timeout(timeout, source.poll()).await {
            Ok(Ok(bits)) => self.engine.on_buzz(bits, round),
            Ok(Err(e)) if e.is_transient() => {
                debug!(error = %e, "no buzzer reading this tick");
                Disposition::Ignored(IgnoreReason::NoReading)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "input source unusable");
                Disposition::Ignored(IgnoreReason::HardwareUnavailable)
            }
            Err(_) => {
                debug!(
                    timeout_ms = timeout.as_millis() as u64,
                    "buzzer poll timed out"
                );
                Disposition::Ignored(IgnoreReason::NoReading)
            }
        };
        Ok(self.publish(disposition))
    }

    /// Start polling `source` in the background.
    ///
    /// Any poller already attached is stopped first. Buzzes arrive on the
    /// returned mailbox and must be passed to
    /// [`handle_buzz`](Self::handle_buzz).
    ///
    /// # Errors
    ///
    /// Returns `CommandError::ShutDown` after [`shutdown`](Self::shutdown).
    pub async fn attach_poller(&mut self, source: AnyInputSource) -> CommandResult<BuzzMailbox> {
        self.ensure_running()?;
        if let Some(previous) = self.poller.take() {
            previous.shutdown().await;
        }

        let poller = BuzzPoller::new(source, self.gate.subscribe(), self.engine.config());
        let (handle, mailbox) = poller.start();
        self.poller = Some(handle);
        Ok(mailbox)
    }

    /// Stop the background poller, if any, and refuse further commands.
    ///
    /// Returns the final snapshot. Calling it again is harmless.
    pub async fn shutdown(&mut self) -> SessionSnapshot {
        if !self.shut_down {
            self.shut_down = true;
            self.gate.send_replace(BuzzGate::closed(self.engine.config().roster_size));
            if let Some(poller) = self.poller.take() {
                poller.shutdown().await;
            }
            info!("session controller shut down");
        }
        self.snapshot()
    }

    fn ensure_running(&self) -> CommandResult<()> {
        if self.shut_down {
            debug!("command refused after shutdown");
            return Err(CommandError::ShutDown);
        }
        Ok(())
    }

    fn reply(&self, disposition: Disposition) -> CommandReply {
        CommandReply {
            disposition,
            snapshot: self.snapshot(),
        }
    }

    /// Publish events, snapshot and gate after the engine has run.
    fn publish(&mut self, disposition: Disposition) -> CommandReply {
        for event in self.engine.take_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }

        let snapshot = self.engine.snapshot();
        self.gate.send_replace(BuzzGate {
            armed: snapshot.state.accepts_buzzes(),
            round: snapshot.round,
            lockouts: *self.engine.lockouts(),
        });
        self.snapshots.send_replace(snapshot.clone());

        CommandReply {
            disposition,
            snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdvancePolicy;
    use crate::state::RoundState;
    use quizbuzz_hardware::mock::{MockBuzzerPanel, MockFault};
    use quizbuzz_storage::{MemoryStore, QuestionRecord, default_records};
    use std::time::Duration;

    fn p(i: u8) -> ContestantId {
        ContestantId::new(i, 4).unwrap()
    }

    fn bank(questions: &[QuestionRecord]) -> QuestionBank<MemoryStore> {
        let mut records = default_records();
        for (slot, record) in records.iter_mut().zip(questions) {
            *slot = record.clone();
        }
        QuestionBank::new(MemoryStore::with_records(records))
    }

    fn controller(questions: &[QuestionRecord]) -> SessionController<MemoryStore> {
        let config = GameConfig::default().advance_policy(AdvancePolicy::HostPaced);
        SessionController::new(bank(questions), config).unwrap()
    }

    fn capital() -> QuestionRecord {
        QuestionRecord::new("Capital of Chile?", ["Lima", "Santiago", "Quito", ""], 1)
    }

    #[tokio::test]
    async fn test_start_without_enabled_questions() {
        let mut controller = controller(&[]);

        assert_eq!(
            controller.start_session().await,
            Err(CommandError::NoEnabledQuestions)
        );
        assert_eq!(controller.snapshot().state, RoundState::Idle);
    }

    #[tokio::test]
    async fn test_start_with_only_blank_questions() {
        let mut blank = capital();
        blank.question = String::new();
        let mut controller = controller(&[blank]);

        assert_eq!(
            controller.start_session().await,
            Err(CommandError::NoEnabledQuestions)
        );
    }

    #[tokio::test]
    async fn test_start_publishes_snapshot_and_events() {
        let mut controller = controller(&[capital()]);
        let mut events = controller.subscribe();
        let snapshots = controller.snapshots();

        let reply = controller.start_session().await.unwrap();
        assert!(reply.is_accepted());
        assert_eq!(reply.snapshot.state, RoundState::AwaitingBuzz);
        assert_eq!(snapshots.borrow().state, RoundState::AwaitingBuzz);

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::SessionStarted { questions: 1 }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::QuestionPresented { number: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_edits_during_session_are_invisible() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();

        controller
            .bank()
            .edit(0, |r| r.question = "Edited".to_string())
            .await
            .unwrap();

        let question = controller.snapshot().question.unwrap();
        assert_eq!(question.text, "Capital of Chile?");

        controller.reset_session().unwrap();
        controller.start_session().await.unwrap();
        assert_eq!(controller.snapshot().question.unwrap().text, "Edited");
    }

    #[tokio::test]
    async fn test_transient_poll_leaves_state_unchanged() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();

        let (mut panel, buttons) = MockBuzzerPanel::new(4);
        buttons.press(0);
        controller.poll_tick(&mut panel).await.unwrap();
        controller.submit_answer(p(0), 0).unwrap();
        let before = controller.snapshot();

        buttons.press(1);
        for fault in [MockFault::Timeout, MockFault::Garbled, MockFault::Disconnected] {
            buttons.inject_fault(fault);
            let reply = controller.poll_tick(&mut panel).await.unwrap();
            assert_eq!(
                reply.disposition,
                Disposition::Ignored(IgnoreReason::NoReading)
            );
            assert_eq!(reply.snapshot, before);
        }
        assert!(controller.engine().lockouts().is_set(0));
    }

    #[tokio::test]
    async fn test_fatal_poll_error_is_reported_not_raised() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();

        let (mut panel, buttons) = MockBuzzerPanel::new(4);
        buttons.inject_fault(MockFault::Misconfigured);
        let reply = controller.poll_tick(&mut panel).await.unwrap();
        assert_eq!(
            reply.disposition,
            Disposition::Ignored(IgnoreReason::HardwareUnavailable)
        );

        // The round can still be played without buzzers.
        assert_eq!(reply.snapshot.state, RoundState::AwaitingBuzz);
    }

    #[tokio::test]
    async fn test_no_poll_while_floor_is_held() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();

        let (mut panel, buttons) = MockBuzzerPanel::new(4);
        buttons.press(2);
        controller.poll_tick(&mut panel).await.unwrap();
        assert_eq!(buttons.poll_count(), 1);

        buttons.press(0);
        let reply = controller.poll_tick(&mut panel).await.unwrap();
        assert_eq!(
            reply.disposition,
            Disposition::Ignored(IgnoreReason::NotAcceptingBuzzes)
        );
        assert_eq!(buttons.poll_count(), 1);
        assert_eq!(reply.snapshot.floor_holder(), Some(p(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_tick_is_bounded_by_timeout() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();

        let (panel, buttons) = MockBuzzerPanel::new(4);
        let mut panel = panel.with_latency(Duration::from_secs(30));
        buttons.press(1);

        let started = tokio::time::Instant::now();
        let reply = controller.poll_tick(&mut panel).await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_secs(1));
        assert_eq!(
            reply.disposition,
            Disposition::Ignored(IgnoreReason::NoReading)
        );
    }

    #[tokio::test]
    async fn test_gate_follows_round_state() {
        let mut controller = controller(&[capital()]);
        let gate = controller.gate();
        assert!(!gate.borrow().armed);

        controller.start_session().await.unwrap();
        assert!(gate.borrow().armed);
        let round = gate.borrow().round;

        let bits = quizbuzz_core::InputBits::empty(4).with(3);
        controller.handle_buzz(BuzzEvent { bits, round }).unwrap();
        assert!(!gate.borrow().armed);

        controller.submit_answer(p(3), 0).unwrap();
        assert!(gate.borrow().armed);
        assert!(gate.borrow().lockouts.is_set(3));
    }

    #[tokio::test]
    async fn test_stale_buzz_from_mailbox_is_ignored() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();
        let stale = controller.snapshot().round;
        controller.reset_round().unwrap();

        let bits = quizbuzz_core::InputBits::empty(4).with(0);
        let reply = controller
            .handle_buzz(BuzzEvent { bits, round: stale })
            .unwrap();
        assert_eq!(
            reply.disposition,
            Disposition::Ignored(IgnoreReason::StaleRound)
        );
    }

    #[tokio::test]
    async fn test_commands_after_shutdown() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();

        let last = controller.shutdown().await;
        assert_eq!(last.state, RoundState::AwaitingBuzz);
        assert!(controller.is_shut_down());

        assert_eq!(controller.advance(), Err(CommandError::ShutDown));
        assert_eq!(
            controller.start_session().await,
            Err(CommandError::ShutDown)
        );
        assert_eq!(
            controller.submit_answer(p(0), 1),
            Err(CommandError::ShutDown)
        );
        assert!(!controller.gate().borrow().armed);

        // Idempotent.
        assert_eq!(controller.shutdown().await, last);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_poller_feeds_engine() {
        let mut controller = controller(&[capital()]);
        controller.start_session().await.unwrap();

        let (panel, buttons) = MockBuzzerPanel::new(4);
        let mut mailbox = controller.attach_poller(panel.into()).await.unwrap();

        buttons.press(1);
        let buzz = mailbox.recv().await.unwrap();
        let reply = controller.handle_buzz(buzz).unwrap();
        assert_eq!(reply.snapshot.floor_holder(), Some(p(1)));

        controller.shutdown().await;
        assert!(mailbox.recv().await.is_none());
    }
}
