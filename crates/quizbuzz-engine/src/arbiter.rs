//! Buzz arbitration.
//!
//! The poll cadence (around 100 ms) is far coarser than the time between two
//! real presses, so arrival order cannot be recovered from a snapshot. Ties
//! are broken by position instead: the lowest-numbered eligible contestant
//! holding a button wins. The same snapshot and lockout set always produce
//! the same winner.

use quizbuzz_core::{ContestantId, InputBits};

/// Deterministic "first valid press wins" rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuzzArbiter;

impl BuzzArbiter {
    /// Pick the contestant who gets the floor, if anyone.
    ///
    /// Scans positions `0..lockouts.width()` in ascending order and returns
    /// the first one that is pressed in `bits` and not set in `lockouts`.
    /// Inputs beyond the roster width are never considered.
    ///
    /// # Examples
    ///
    /// ```
    /// use quizbuzz_core::InputBits;
    /// use quizbuzz_engine::BuzzArbiter;
    ///
    /// let pressed = InputBits::empty(4).with(1).with(3);
    /// let lockouts = InputBits::empty(4).with(1);
    ///
    /// let winner = BuzzArbiter::arbitrate(&pressed, &lockouts).unwrap();
    /// assert_eq!(winner.index(), 3);
    /// ```
    #[must_use]
    pub fn arbitrate(bits: &InputBits, lockouts: &InputBits) -> Option<ContestantId> {
        let roster = lockouts.width();
        let eligible = InputBits::from_mask(bits.as_mask() & !lockouts.as_mask(), roster);
        eligible.iter().next()
    }
}
