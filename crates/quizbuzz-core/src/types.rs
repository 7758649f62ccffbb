use crate::{
    Result,
    constants::{MAX_CONTESTANTS, MAX_OPTIONS},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contestant identifier (0-based position on the buzzer panel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContestantId(u8);

impl ContestantId {
    /// Create a contestant ID checked against the roster size.
    ///
    /// # Errors
    /// Returns `Error::ContestantOutOfRange` if `id` is not below `roster_size`.
    pub fn new(id: u8, roster_size: usize) -> Result<Self> {
        if usize::from(id) >= roster_size {
            return Err(Error::ContestantOutOfRange { id, roster_size });
        }
        Ok(ContestantId(id))
    }

    /// Create a contestant ID from a bit position the caller already bounds-checked.
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < MAX_CONTESTANTS, "index must fit the input width");
        ContestantId(index as u8)
    }

    /// Get the raw ID as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Get the ID as a bit position / array index.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.0)
    }
}

/// Contestants are labelled `P1`..`PN` on the panel.
impl fmt::Display for ContestantId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "P{}", u16::from(self.0) + 1)
    }
}

/// Fixed-width vector of discrete input bits, one per contestant.
///
/// Used both for raw buzzer snapshots (bit set = button held) and for the
/// per-round lockout set (bit set = contestant excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputBits {
    mask: u32,
    width: u8,
}

impl InputBits {
    /// Create an all-clear vector of `width` bits.
    ///
    /// Widths above [`MAX_CONTESTANTS`] are clamped.
    #[must_use]
    pub fn empty(width: usize) -> Self {
        debug_assert!(width <= MAX_CONTESTANTS, "width must be at most 32");
        Self {
            mask: 0,
            width: width.min(MAX_CONTESTANTS) as u8,
        }
    }

    /// Create a vector from a raw mask, bit 0 being contestant 0.
    ///
    /// Bits at or above `width` are discarded.
    #[must_use]
    pub fn from_mask(mask: u32, width: usize) -> Self {
        let mut bits = Self::empty(width);
        bits.mask = mask & bits.full_mask();
        bits
    }

    /// Create a vector from a slice of booleans.
    ///
    /// # Errors
    /// Returns `Error::InvalidRosterSize` if the slice is longer than
    /// [`MAX_CONTESTANTS`].
    pub fn from_bools(values: &[bool]) -> Result<Self> {
        if values.len() > MAX_CONTESTANTS {
            return Err(Error::InvalidRosterSize(values.len()));
        }
        let mut bits = Self::empty(values.len());
        for (i, &v) in values.iter().enumerate() {
            if v {
                bits.set(i);
            }
        }
        Ok(bits)
    }

    /// Number of bits in the vector.
    #[must_use]
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    /// Raw mask, bit 0 being contestant 0.
    #[must_use]
    pub fn as_mask(&self) -> u32 {
        self.mask
    }

    /// Check whether bit `index` is set. Out-of-range indexes read as clear.
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        index < self.width() && self.mask & (1 << index) != 0
    }

    /// Set bit `index`. Out-of-range indexes are ignored.
    pub fn set(&mut self, index: usize) {
        if index < self.width() {
            self.mask |= 1 << index;
        }
    }

    /// Clear bit `index`.
    pub fn unset(&mut self, index: usize) {
        if index < self.width() {
            self.mask &= !(1 << index);
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, index: usize) -> Self {
        self.set(index);
        self
    }

    /// Clear every bit, keeping the width.
    pub fn clear(&mut self) {
        self.mask = 0;
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// True if at least one bit is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.mask != 0
    }

    /// True if every bit of the vector is set.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.width > 0 && self.mask == self.full_mask()
    }

    /// Iterate over the set bit positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ContestantId> + '_ {
        (0..self.width())
            .filter(|&i| self.is_set(i))
            .map(ContestantId::from_index)
    }

    fn full_mask(&self) -> u32 {
        if self.width() >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }
}

impl fmt::Display for InputBits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..self.width() {
            f.write_str(if self.is_set(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// A question as presented to contestants.
///
/// Options are stored with blank entries already stripped, and
/// `correct` indexes into that stripped list. A question whose correct
/// slot was blank, or that has no options at all, has `correct == None`
/// and can only be resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct: Option<usize>,
    pub enabled: bool,
}

impl Question {
    /// Build a question from raw answer slots.
    ///
    /// `correct_slot` indexes the raw slots (blanks included); it is
    /// remapped onto the displayed options. Blank means empty after
    /// trimming whitespace.
    ///
    /// # Errors
    /// Returns `Error::TooManyOptions` if more than [`MAX_OPTIONS`] slots are given.
    ///
    /// # Examples
    ///
    /// ```
    /// use quizbuzz_core::Question;
    ///
    /// let q = Question::from_slots("2 + 2?", ["", "3", "4", ""], 2).unwrap();
    /// assert_eq!(q.options, vec!["3", "4"]);
    /// assert_eq!(q.correct, Some(1));
    /// ```
    pub fn from_slots<I, S>(text: impl Into<String>, slots: I, correct_slot: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots: Vec<String> = slots.into_iter().map(Into::into).collect();
        if slots.len() > MAX_OPTIONS {
            return Err(Error::TooManyOptions { count: slots.len() });
        }

        let mut options = Vec::with_capacity(slots.len());
        let mut correct = None;
        for (slot, answer) in slots.into_iter().enumerate() {
            if answer.trim().is_empty() {
                continue;
            }
            if slot == correct_slot {
                correct = Some(options.len());
            }
            options.push(answer);
        }

        Ok(Self {
            text: text.into(),
            options,
            correct,
            enabled: true,
        })
    }

    /// Build a question from already-stripped options.
    ///
    /// # Errors
    /// Returns an error if there are too many options or `correct` is not
    /// one of them.
    pub fn new(text: impl Into<String>, options: Vec<String>, correct: usize) -> Result<Self> {
        if options.len() > MAX_OPTIONS {
            return Err(Error::TooManyOptions {
                count: options.len(),
            });
        }
        if correct >= options.len() {
            return Err(Error::CorrectOptionOutOfRange {
                index: correct,
                count: options.len(),
            });
        }
        Ok(Self {
            text: text.into(),
            options,
            correct: Some(correct),
            enabled: true,
        })
    }

    /// A question with no answerable options, adjudicated by the host.
    pub fn host_adjudicated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
            correct: None,
            enabled: true,
        }
    }

    /// True if the question has no text body and must be skipped.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// True if the round cannot be resolved by answer checking.
    #[must_use]
    pub fn is_host_adjudicated(&self) -> bool {
        self.options.is_empty() || self.correct.is_none()
    }

    /// Check a displayed option index against the correct one.
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        self.correct == Some(option)
    }
}

/// A contestant's standing for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: ContestantId,
    pub score: u32,
}

impl Contestant {
    pub fn new(id: ContestantId) -> Self {
        Self { id, score: 0 }
    }

    /// Build the full zero-score roster `0..roster_size`.
    pub fn roster(roster_size: usize) -> Vec<Self> {
        (0..roster_size.min(MAX_CONTESTANTS))
            .map(|i| Self::new(ContestantId::from_index(i)))
            .collect()
    }

    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}
