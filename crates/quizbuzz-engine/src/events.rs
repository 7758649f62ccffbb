//! What the engine tells the outside world.
//!
//! A presentation layer never touches session state directly. It receives
//! [`SessionEvent`]s as things happen and can read the latest
//! [`SessionSnapshot`] at any time.

use std::fmt;

use quizbuzz_core::{Contestant, ContestantId, Question};
use serde::{Deserialize, Serialize};

use crate::state::{RoundOutcome, RoundState};

/// Notification of a change in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionEvent {
    /// A new session took its question snapshot.
    SessionStarted { questions: usize },

    /// A question is on screen. `number` counts presented questions from 1;
    /// `index` is its position in the session's question list.
    QuestionPresented {
        number: usize,
        index: usize,
        question: Question,
        manual: bool,
    },

    /// A contestant won the buzz.
    FloorGranted { contestant: ContestantId },

    /// The floor holder picked an option.
    AnswerJudged {
        contestant: ContestantId,
        option: usize,
        correct: bool,
        points: u32,
    },

    /// A contestant may not buzz again this round.
    LockedOut { contestant: ContestantId },

    /// The host cleared the floor and lockouts of the current round.
    RoundReset,

    /// The current round has an outcome.
    RoundResolved { outcome: RoundOutcome },

    /// No questions are left.
    GameOver { report: GameReport },

    /// The session was discarded.
    SessionReset,
}

/// Final standings of a finished session.
///
/// Winners are every contestant sharing the top score, so a tie lists
/// several. A game in which nobody scored still ends normally, with the
/// whole roster tied at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub winners: Vec<ContestantId>,
    pub top_score: u32,
    pub standings: Vec<Contestant>,
}

impl GameReport {
    /// Compute the report for a roster.
    ///
    /// # Examples
    ///
    /// ```
    /// use quizbuzz_core::Contestant;
    /// use quizbuzz_engine::GameReport;
    ///
    /// let mut roster = Contestant::roster(3);
    /// roster[0].award(100);
    /// roster[2].award(100);
    ///
    /// let report = GameReport::from_roster(&roster);
    /// assert_eq!(report.to_string(), "Tie between: P1, P3\nScore: 100");
    /// ```
    pub fn from_roster(contestants: &[Contestant]) -> Self {
        let top_score = contestants.iter().map(|c| c.score).max().unwrap_or(0);
        let winners = contestants
            .iter()
            .filter(|c| c.score == top_score)
            .map(|c| c.id)
            .collect();

        Self {
            winners,
            top_score,
            standings: contestants.to_vec(),
        }
    }

    /// True if nobody answered anything correctly.
    pub fn nobody_scored(&self) -> bool {
        self.top_score == 0
    }
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nobody_scored() {
            return write!(f, "Game finished. No points scored.");
        }
        match self.winners.as_slice() {
            [winner] => write!(
                f,
                "Winner: Player {}\nScore: {}",
                winner.index() + 1,
                self.top_score
            ),
            winners => {
                let names: Vec<String> = winners.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "Tie between: {}\nScore: {}",
                    names.join(", "),
                    self.top_score
                )
            }
        }
    }
}

/// Per-contestant view in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestantStatus {
    pub id: ContestantId,
    pub score: u32,
    pub locked_out: bool,
    pub has_floor: bool,
}

/// Read-only copy of the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Round state.
    pub state: RoundState,

    /// Increments whenever a new round opens or the current one is reset.
    pub round: u64,

    /// Position of the current question in the session's list.
    pub question_index: Option<usize>,

    /// The question on screen, if any.
    pub question: Option<Question>,

    /// Number of questions in the session's list, placeholders included.
    pub question_count: usize,

    pub contestants: Vec<ContestantStatus>,

    /// True once the session has run out of questions.
    pub finished: bool,

    /// Final standings; only set when `finished`.
    pub report: Option<GameReport>,
}

impl SessionSnapshot {
    /// Snapshot of a controller with no session.
    pub fn idle(roster_size: usize) -> Self {
        Self {
            state: RoundState::Idle,
            round: 0,
            question_index: None,
            question: None,
            question_count: 0,
            contestants: Contestant::roster(roster_size)
                .into_iter()
                .map(|c| ContestantStatus {
                    id: c.id,
                    score: 0,
                    locked_out: false,
                    has_floor: false,
                })
                .collect(),
            finished: false,
            report: None,
        }
    }

    /// The contestant holding the floor, if any.
    pub fn floor_holder(&self) -> Option<ContestantId> {
        self.state.floor_holder()
    }

    /// Score of contestant `index`, or 0 for an unknown index.
    pub fn score(&self, index: usize) -> u32 {
        self.contestants.get(index).map_or(0, |c| c.score)
    }

    pub fn scores(&self) -> Vec<u32> {
        self.contestants.iter().map(|c| c.score).collect()
    }

    /// Winners of a finished session; empty otherwise.
    pub fn winners(&self) -> &[ContestantId] {
        self.report
            .as_ref()
            .map(|r| r.winners.as_slice())
            .unwrap_or_default()
    }
}
