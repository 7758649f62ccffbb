//! Error types for the session command surface.
//!
//! Round-level refusals are not errors: a command that does not apply to the
//! current round comes back as [`Disposition::Ignored`](crate::Disposition).
//! The variants below are the only ways a command can fail outright.

/// Result type alias for session commands.
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Errors returned by [`SessionController`](crate::SessionController) commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The controller has been shut down and accepts no more commands.
    #[error("session controller is shut down")]
    ShutDown,

    /// The question bank has no enabled question with text to present.
    #[error("no enabled questions to play")]
    NoEnabledQuestions,
}
