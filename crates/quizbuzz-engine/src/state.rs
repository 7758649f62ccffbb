//! Round state machine.
//!
//! Each question is played as one round. The machine below only knows which
//! round states may follow which; scoring, lockouts and the question cursor
//! live in [`RoundEngine`](crate::RoundEngine), which drives it.
//!
//! # States
//!
//! - `Idle`: no question on screen (before a session starts, or after it ends)
//! - `AwaitingBuzz`: question shown, buzzers armed
//! - `ManualWinner`: question shown, buzzers disarmed, the host picks a winner
//! - `AwaitingAnswer(c)`: contestant `c` holds the floor
//! - `Resolved(outcome)`: the round is over
//!
//! # Valid Transitions
//!
//! - Idle → AwaitingBuzz | ManualWinner (question loaded)
//! - AwaitingBuzz → AwaitingAnswer (buzz granted) | Resolved(Exhausted)
//! - AwaitingAnswer → Resolved(Correct) | AwaitingBuzz (wrong answer or round reset)
//! - ManualWinner → Resolved(Manual)
//! - Resolved(Exhausted) → AwaitingBuzz (round reset)
//! - Resolved → AwaitingBuzz | ManualWinner (next question) | Idle (game over)
//!
//! # Examples
//!
//! ```
//! use quizbuzz_core::ContestantId;
//! use quizbuzz_engine::{RoundState, RoundStateMachine};
//!
//! let mut machine = RoundStateMachine::new();
//! machine.transition_to(RoundState::AwaitingBuzz).unwrap();
//!
//! let p2 = ContestantId::new(1, 4).unwrap();
//! machine.transition_to(RoundState::AwaitingAnswer(p2)).unwrap();
//! assert_eq!(machine.current_state().floor_holder(), Some(p2));
//!
//! // A second floor can never be granted on top of the first.
//! let p3 = ContestantId::new(2, 4).unwrap();
//! assert!(machine.transition_to(RoundState::AwaitingAnswer(p3)).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;

use quizbuzz_core::ContestantId;
use serde::{Deserialize, Serialize};

/// Maximum number of transitions kept in history.
///
/// A round takes at most a handful of transitions per contestant, so this
/// covers the last several questions of a four-player game.
const MAX_HISTORY_SIZE: usize = 100;

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// The floor holder picked the correct option.
    Correct { contestant: ContestantId, points: u32 },

    /// The host declared a winner on a question without a correct option.
    Manual { contestant: ContestantId, points: u32 },

    /// Every contestant answered wrong; nobody scores.
    Exhausted,
}

impl RoundOutcome {
    /// The contestant who won the round, if anyone did.
    pub fn winner(&self) -> Option<ContestantId> {
        match self {
            Self::Correct { contestant, .. } | Self::Manual { contestant, .. } => Some(*contestant),
            Self::Exhausted => None,
        }
    }

    /// Points awarded for the round.
    pub fn points(&self) -> u32 {
        match self {
            Self::Correct { points, .. } | Self::Manual { points, .. } => *points,
            Self::Exhausted => 0,
        }
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct { contestant, points } => {
                write!(f, "{contestant} answered correctly (+{points})")
            }
            Self::Manual { contestant, points } => {
                write!(f, "{contestant} declared winner (+{points})")
            }
            Self::Exhausted => write!(f, "nobody answered correctly"),
        }
    }
}

/// Every state a round can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum RoundState {
    /// No question on screen.
    Idle,

    /// Question shown, waiting for an eligible contestant to buzz.
    AwaitingBuzz,

    /// Question without a correct option; only the host can resolve it.
    ManualWinner,

    /// One contestant holds the floor and may answer.
    AwaitingAnswer(ContestantId),

    /// The round is over.
    Resolved(RoundOutcome),
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundState::Idle => write!(f, "Idle"),
            RoundState::AwaitingBuzz => write!(f, "AwaitingBuzz"),
            RoundState::ManualWinner => write!(f, "ManualWinner"),
            RoundState::AwaitingAnswer(c) => write!(f, "AwaitingAnswer({c})"),
            RoundState::Resolved(_) => write!(f, "Resolved"),
        }
    }
}

impl RoundState {
    /// Check if transition to `target` is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use quizbuzz_engine::{RoundOutcome, RoundState};
    ///
    /// assert!(RoundState::Idle.can_transition_to(&RoundState::AwaitingBuzz));
    /// assert!(RoundState::AwaitingBuzz.can_transition_to(&RoundState::Resolved(RoundOutcome::Exhausted)));
    /// assert!(!RoundState::ManualWinner.can_transition_to(&RoundState::Resolved(RoundOutcome::Exhausted)));
    /// ```
    pub fn can_transition_to(&self, target: &RoundState) -> bool {
        use RoundOutcome::*;
        use RoundState::*;

        matches!(
            (self, target),
            // Question loaded
            (Idle, AwaitingBuzz | ManualWinner)
            // Buzz granted, or everyone locked out
            | (AwaitingBuzz, AwaitingAnswer(_))
            | (AwaitingBuzz, Resolved(Exhausted))
            // Answer judged, or floor withdrawn
            | (AwaitingAnswer(_), AwaitingBuzz)
            | (AwaitingAnswer(_), Resolved(Correct { .. }))
            // Host decision
            | (ManualWinner, Resolved(Manual { .. }))
            // Next question, reopened round, or game over
            | (Resolved(_), AwaitingBuzz | ManualWinner | Idle)
        )
    }

    /// The contestant holding the floor, if any.
    pub fn floor_holder(&self) -> Option<ContestantId> {
        match self {
            RoundState::AwaitingAnswer(c) => Some(*c),
            _ => None,
        }
    }

    /// True while buzzes can be granted.
    pub fn accepts_buzzes(&self) -> bool {
        matches!(self, RoundState::AwaitingBuzz)
    }

    /// True once the round has an outcome.
    pub fn is_resolved(&self) -> bool {
        matches!(self, RoundState::Resolved(_))
    }
}

/// A single recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTransition {
    pub from: RoundState,
    pub to: RoundState,
}

impl RoundTransition {
    pub fn new(from: RoundState, to: RoundState) -> Self {
        Self { from, to }
    }
}

/// Rejected transition: the pair is not in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid round transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RoundState,
    pub to: RoundState,
}

/// Validated round state with a bounded transition history.
///
/// Not thread-safe; the engine that owns it is driven from one task.
#[derive(Debug)]
pub struct RoundStateMachine {
    current_state: RoundState,
    history: VecDeque<RoundTransition>,
}

impl Default for RoundStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundStateMachine {
    /// Create a machine in `Idle`.
    pub fn new() -> Self {
        Self {
            current_state: RoundState::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> &RoundState {
        &self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<RoundTransition> {
        &self.history
    }

    /// Move to `new_state` if the transition table allows it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] and leaves the state untouched if the
    /// pair is not allowed.
    pub fn transition_to(
        &mut self,
        new_state: RoundState,
    ) -> std::result::Result<RoundTransition, InvalidTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(InvalidTransition {
                from: self.current_state,
                to: new_state,
            });
        }

        let transition = RoundTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition);
        Ok(transition)
    }

    /// Return to `Idle` from any state, recording the jump.
    pub fn reset(&mut self) {
        if self.current_state != RoundState::Idle {
            let transition = RoundTransition::new(self.current_state, RoundState::Idle);
            self.perform_state_change(RoundState::Idle, transition);
        }
    }

    fn perform_state_change(&mut self, new_state: RoundState, transition: RoundTransition) {
        self.current_state = new_state;

        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition);
    }
}
