//! Game configuration.

use std::time::Duration;

use quizbuzz_core::constants::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_TIMEOUT_MS, DEFAULT_ROSTER_SIZE, MAX_CONTESTANTS,
    POINTS_AFTER_WRONG_ANSWER, POINTS_FIRST_ATTEMPT,
};
use quizbuzz_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// What happens after a round is won.
///
/// A round that nobody could answer always waits for an explicit
/// `advance()`, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Present the next question as soon as the round is won.
    #[default]
    Immediate,

    /// Hold the resolved round on screen until the host advances.
    HostPaced,
}

/// Rules and cadence for a game session.
///
/// # Examples
///
/// ```
/// use quizbuzz_engine::{AdvancePolicy, GameConfig};
///
/// let config = GameConfig::default()
///     .roster_size(6)
///     .advance_policy(AdvancePolicy::HostPaced);
///
/// assert_eq!(config.points_first_attempt, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of contestants, one per buzzer input.
    pub roster_size: usize,

    /// Delay between buzzer polls.
    pub poll_interval_ms: u64,

    /// Upper bound on a single poll, after which it counts as a failed read.
    pub poll_timeout_ms: u64,

    /// Points for a correct answer when nobody has missed the question yet.
    pub points_first_attempt: u32,

    /// Points for a correct answer after at least one wrong answer.
    pub points_after_wrong: u32,

    /// Points the host awards when declaring a winner by hand.
    pub manual_points: u32,

    /// Whether a won round moves on by itself.
    pub advance: AdvancePolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            roster_size: DEFAULT_ROSTER_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            points_first_attempt: POINTS_FIRST_ATTEMPT,
            points_after_wrong: POINTS_AFTER_WRONG_ANSWER,
            manual_points: POINTS_FIRST_ATTEMPT,
            advance: AdvancePolicy::default(),
        }
    }
}

impl GameConfig {
    pub fn roster_size(mut self, size: usize) -> Self {
        self.roster_size = size;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn poll_timeout_ms(mut self, ms: u64) -> Self {
        self.poll_timeout_ms = ms;
        self
    }

    pub fn advance_policy(mut self, policy: AdvancePolicy) -> Self {
        self.advance = policy;
        self
    }

    /// Poll cadence, never shorter than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Check the roster fits the buzzer panel and the cadence is usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRosterSize` for an empty or oversized roster.
    pub fn validate(&self) -> Result<()> {
        if self.roster_size == 0 || self.roster_size > MAX_CONTESTANTS {
            return Err(Error::InvalidRosterSize(self.roster_size));
        }
        Ok(())
    }
}
