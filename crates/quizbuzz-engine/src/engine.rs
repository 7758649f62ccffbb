//! The round engine: scores, lockouts and the question cursor.
//!
//! [`RoundEngine`] owns all session state and is the only thing that mutates
//! it. It cannot fail. Every input is either applied or ignored, and an
//! ignored input leaves the state exactly as it was. Observable changes are
//! queued as [`SessionEvent`]s for the caller to drain.
//!
//! # Scoring
//!
//! A correct answer earns the first-attempt points (100 by default) if
//! nobody has been locked out of the round yet, and the reduced points (50)
//! otherwise, however many wrong answers came before. A wrong answer never
//! changes a score.
//!
//! # Examples
//!
//! ```
//! use quizbuzz_core::{ContestantId, InputBits, Question};
//! use quizbuzz_engine::{GameConfig, RoundEngine, RoundState};
//!
//! let mut engine = RoundEngine::new(GameConfig::default()).unwrap();
//! let question = Question::from_slots("2 + 2?", ["3", "4", "5", ""], 1).unwrap();
//! engine.start(vec![question]);
//! assert_eq!(engine.state(), &RoundState::AwaitingBuzz);
//!
//! // P3 buzzes and answers correctly on the first attempt.
//! engine.on_buzz(InputBits::empty(4).with(2), engine.round());
//! let p3 = ContestantId::new(2, 4).unwrap();
//! assert!(engine.submit_answer(p3, 1).is_accepted());
//!
//! assert_eq!(engine.contestants()[2].score, 100);
//! assert!(engine.is_finished());
//! ```

use std::fmt;

use quizbuzz_core::{Contestant, ContestantId, InputBits, Question};
use tracing::{debug, info, warn};

use crate::arbiter::BuzzArbiter;
use crate::config::{AdvancePolicy, GameConfig};
use crate::events::{ContestantStatus, GameReport, SessionEvent, SessionSnapshot};
use crate::state::{RoundOutcome, RoundState, RoundStateMachine};

/// Why an input was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No session has been started.
    NoSession,

    /// The session has already ended.
    Finished,

    /// The input belongs to a round that has since changed.
    StaleRound,

    /// Buzzers are not armed in the current state.
    NotAcceptingBuzzes,

    /// Nobody eligible was pressing.
    NoEligiblePress,

    /// Nobody holds the floor.
    NoFloor,

    /// Someone other than the floor holder tried to answer.
    NotFloorHolder,

    /// The option does not exist on the current question.
    OptionOutOfRange,

    /// The current round is not host-adjudicated.
    NotManualRound,

    /// The contestant is not on the roster.
    UnknownContestant,

    /// The round has no outcome yet.
    RoundInProgress,

    /// The input source gave no reading this tick.
    NoReading,

    /// The input source can no longer be used.
    HardwareUnavailable,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoSession => "no session running",
            Self::Finished => "session already finished",
            Self::StaleRound => "input from an earlier round",
            Self::NotAcceptingBuzzes => "buzzers not armed",
            Self::NoEligiblePress => "no eligible buzzer pressed",
            Self::NoFloor => "nobody holds the floor",
            Self::NotFloorHolder => "contestant does not hold the floor",
            Self::OptionOutOfRange => "no such option",
            Self::NotManualRound => "round is not host-adjudicated",
            Self::UnknownContestant => "contestant not on the roster",
            Self::RoundInProgress => "round not resolved yet",
            Self::NoReading => "no reading from input source",
            Self::HardwareUnavailable => "input source unavailable",
        };
        f.write_str(reason)
    }
}

/// Whether the engine applied an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accepted,
    Ignored(IgnoreReason),
}

impl Disposition {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Disposition::Accepted)
    }

    pub fn ignored_because(&self) -> Option<IgnoreReason> {
        match self {
            Disposition::Ignored(reason) => Some(*reason),
            Disposition::Accepted => None,
        }
    }
}

/// Owner of the session state.
#[derive(Debug)]
pub struct RoundEngine {
    config: GameConfig,
    contestants: Vec<Contestant>,
    questions: Vec<Question>,

    /// Index of the question on screen; `None` before the first one.
    cursor: Option<usize>,

    /// Questions presented so far in this session.
    presented: usize,

    machine: RoundStateMachine,
    lockouts: InputBits,
    round: u64,
    started: bool,
    report: Option<GameReport>,
    events: Vec<SessionEvent>,
}

impl RoundEngine {
    /// Create an engine with no session.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: GameConfig) -> quizbuzz_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            contestants: Contestant::roster(config.roster_size),
            lockouts: InputBits::empty(config.roster_size),
            config,
            questions: Vec::new(),
            cursor: None,
            presented: 0,
            machine: RoundStateMachine::new(),
            round: 0,
            started: false,
            report: None,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        self.machine.current_state()
    }

    /// Round generation. Inputs stamped with an older value are stale.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn lockouts(&self) -> &InputBits {
        &self.lockouts
    }

    pub fn contestants(&self) -> &[Contestant] {
        &self.contestants
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.report.is_some()
    }

    /// Final standings, once the session is finished.
    pub fn report(&self) -> Option<&GameReport> {
        self.report.as_ref()
    }

    /// The question on screen.
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.cursor.and_then(|i| self.questions.get(i))
    }

    /// Remove and return the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a new session on `questions`, discarding any previous one.
    ///
    /// Scores are zeroed and the cursor restarts before the first question.
    /// Questions without text are skipped. An empty list ends the session
    /// immediately with nobody scoring.
    pub fn start(&mut self, questions: Vec<Question>) -> Disposition {
        self.clear_session();
        self.started = true;
        self.questions = questions;

        info!(questions = self.questions.len(), "session started");
        self.events.push(SessionEvent::SessionStarted {
            questions: self.questions.len(),
        });

        self.load_next();
        Disposition::Accepted
    }

    /// Discard the session and return to `Idle` with no session.
    pub fn reset(&mut self) -> Disposition {
        self.clear_session();
        info!("session reset");
        self.events.push(SessionEvent::SessionReset);
        Disposition::Accepted
    }

    /// Offer a buzzer snapshot taken during round `round`.
    ///
    /// The floor goes to the lowest-numbered contestant who is pressing and
    /// not locked out. Snapshots from an earlier round, or arriving while
    /// the buzzers are not armed, are ignored.
    pub fn on_buzz(&mut self, bits: InputBits, round: u64) -> Disposition {
        if let Some(reason) = self.session_guard() {
            return self.ignore("buzz", reason);
        }
        if round != self.round {
            return self.ignore("buzz", IgnoreReason::StaleRound);
        }
        if !self.state().accepts_buzzes() {
            return self.ignore("buzz", IgnoreReason::NotAcceptingBuzzes);
        }

        let Some(contestant) = BuzzArbiter::arbitrate(&bits, &self.lockouts) else {
            return self.ignore("buzz", IgnoreReason::NoEligiblePress);
        };

        self.transition(RoundState::AwaitingAnswer(contestant));
        info!(%contestant, %bits, round = self.round, "floor granted");
        self.events.push(SessionEvent::FloorGranted { contestant });
        Disposition::Accepted
    }

    /// Judge `option` as the answer of `contestant`.
    ///
    /// Only the floor holder can answer. Options are indexes into the
    /// question's displayed (non-blank) options.
    pub fn submit_answer(&mut self, contestant: ContestantId, option: usize) -> Disposition {
        if let Some(reason) = self.session_guard() {
            return self.ignore("answer", reason);
        }
        let holder = match self.state() {
            RoundState::AwaitingAnswer(holder) => *holder,
            _ => return self.ignore("answer", IgnoreReason::NoFloor),
        };
        if holder != contestant {
            return self.ignore("answer", IgnoreReason::NotFloorHolder);
        }
        let Some(question) = self.current_question() else {
            return self.ignore("answer", IgnoreReason::NoFloor);
        };
        if option >= question.options.len() {
            return self.ignore("answer", IgnoreReason::OptionOutOfRange);
        }
        let correct = question.is_correct(option);

        if correct {
            let points = if self.lockouts.any() {
                self.config.points_after_wrong
            } else {
                self.config.points_first_attempt
            };
            self.award(contestant, points);
            self.events.push(SessionEvent::AnswerJudged {
                contestant,
                option,
                correct: true,
                points,
            });
            self.resolve(RoundOutcome::Correct { contestant, points });
            if self.config.advance == AdvancePolicy::Immediate {
                self.load_next();
            }
        } else {
            self.lockouts.set(contestant.index());
            info!(%contestant, option, "wrong answer, locked out");
            self.events.push(SessionEvent::AnswerJudged {
                contestant,
                option,
                correct: false,
                points: 0,
            });
            self.events.push(SessionEvent::LockedOut { contestant });
            self.transition(RoundState::AwaitingBuzz);

            if self.lockouts.is_full() {
                self.resolve(RoundOutcome::Exhausted);
            }
        }
        Disposition::Accepted
    }

    /// Resolve a host-adjudicated round in favour of `contestant`.
    pub fn declare_manual_winner(&mut self, contestant: ContestantId) -> Disposition {
        if let Some(reason) = self.session_guard() {
            return self.ignore("manual winner", reason);
        }
        if self.state() != &RoundState::ManualWinner {
            return self.ignore("manual winner", IgnoreReason::NotManualRound);
        }
        if contestant.index() >= self.contestants.len() {
            return self.ignore("manual winner", IgnoreReason::UnknownContestant);
        }

        let points = self.config.manual_points;
        self.award(contestant, points);
        self.resolve(RoundOutcome::Manual { contestant, points });
        if self.config.advance == AdvancePolicy::Immediate {
            self.load_next();
        }
        Disposition::Accepted
    }

    /// Move past a resolved round to the next question, or end the session.
    pub fn advance(&mut self) -> Disposition {
        if let Some(reason) = self.session_guard() {
            return self.ignore("advance", reason);
        }
        if !self.state().is_resolved() {
            return self.ignore("advance", IgnoreReason::RoundInProgress);
        }
        self.load_next();
        Disposition::Accepted
    }

    /// Clear the floor and every lockout of the current round.
    ///
    /// Scores and the question cursor are untouched. An exhausted round is
    /// reopened; a won round cannot be reset.
    pub fn reset_round(&mut self) -> Disposition {
        if let Some(reason) = self.session_guard() {
            return self.ignore("round reset", reason);
        }
        match self.state() {
            RoundState::AwaitingBuzz
            | RoundState::AwaitingAnswer(_)
            | RoundState::Resolved(RoundOutcome::Exhausted) => {}
            RoundState::ManualWinner => {
                return self.ignore("round reset", IgnoreReason::NotAcceptingBuzzes);
            }
            _ => return self.ignore("round reset", IgnoreReason::RoundInProgress),
        }

        if self.state() != &RoundState::AwaitingBuzz {
            self.transition(RoundState::AwaitingBuzz);
        }
        self.lockouts.clear();
        self.round += 1;
        info!(round = self.round, "round reset");
        self.events.push(SessionEvent::RoundReset);
        Disposition::Accepted
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let holder = self.state().floor_holder();
        SessionSnapshot {
            state: *self.state(),
            round: self.round,
            question_index: self.cursor.filter(|_| !self.is_finished()),
            question: self.current_question().cloned(),
            question_count: self.questions.len(),
            contestants: self
                .contestants
                .iter()
                .map(|c| ContestantStatus {
                    id: c.id,
                    score: c.score,
                    locked_out: self.lockouts.is_set(c.id.index()),
                    has_floor: holder == Some(c.id),
                })
                .collect(),
            finished: self.is_finished(),
            report: self.report.clone(),
        }
    }

    fn session_guard(&self) -> Option<IgnoreReason> {
        if !self.started {
            Some(IgnoreReason::NoSession)
        } else if self.is_finished() {
            Some(IgnoreReason::Finished)
        } else {
            None
        }
    }

    fn clear_session(&mut self) {
        self.contestants = Contestant::roster(self.config.roster_size);
        self.questions.clear();
        self.cursor = None;
        self.presented = 0;
        self.lockouts.clear();
        self.machine.reset();
        self.round += 1;
        self.started = false;
        self.report = None;
    }

    fn award(&mut self, contestant: ContestantId, points: u32) {
        if let Some(entry) = self.contestants.get_mut(contestant.index()) {
            entry.award(points);
            info!(%contestant, points, score = entry.score, "points awarded");
        }
    }

    fn resolve(&mut self, outcome: RoundOutcome) {
        self.transition(RoundState::Resolved(outcome));
        info!(%outcome, "round resolved");
        self.events.push(SessionEvent::RoundResolved { outcome });
    }

    /// Present the next question with text, or finish the session.
    fn load_next(&mut self) {
        let start = self.cursor.map_or(0, |i| i + 1);
        let next = (start..self.questions.len()).find(|&i| !self.questions[i].is_placeholder());

        self.lockouts.clear();
        self.round += 1;

        let Some(index) = next else {
            self.finish();
            return;
        };

        self.cursor = Some(index);
        self.presented += 1;
        let question = self.questions[index].clone();
        let manual = question.is_host_adjudicated();
        self.transition(if manual {
            RoundState::ManualWinner
        } else {
            RoundState::AwaitingBuzz
        });

        info!(number = self.presented, index, manual, "question presented");
        self.events.push(SessionEvent::QuestionPresented {
            number: self.presented,
            index,
            question,
            manual,
        });
    }

    fn finish(&mut self) {
        self.cursor = Some(self.questions.len());
        self.machine.reset();
        let report = GameReport::from_roster(&self.contestants);
        info!(
            winners = ?report.winners,
            top_score = report.top_score,
            "game over"
        );
        self.events.push(SessionEvent::GameOver {
            report: report.clone(),
        });
        self.report = Some(report);
    }

    fn transition(&mut self, to: RoundState) {
        if let Err(e) = self.machine.transition_to(to) {
            // The public methods check the state before transitioning.
            warn!(error = %e, "round transition rejected");
        }
    }

    fn ignore(&self, input: &'static str, reason: IgnoreReason) -> Disposition {
        debug!(input, %reason, state = %self.state(), "input ignored");
        Disposition::Ignored(reason)
    }
}
