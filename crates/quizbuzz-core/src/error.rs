use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Roster errors
    #[error("Contestant {id} is outside the roster of {roster_size}")]
    ContestantOutOfRange { id: u8, roster_size: usize },

    #[error("Invalid roster size {0}: must be 1-{max}", max = crate::constants::MAX_CONTESTANTS)]
    InvalidRosterSize(usize),

    // Question errors
    #[error("Question has {count} options, at most {max} are allowed", max = crate::constants::MAX_OPTIONS)]
    TooManyOptions { count: usize },

    #[error("Correct option {index} is not one of the {count} displayed options")]
    CorrectOptionOutOfRange { index: usize, count: usize },

    #[error("Input vector has {actual} bits, expected {expected}")]
    WidthMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
