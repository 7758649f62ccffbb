use thiserror::Error;

/// Storage-specific error types for the question bank.
///
/// These errors represent failures reading or writing the question store
/// and records that do not satisfy the persistence contract.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store is not valid JSON, or not a list of question records
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store parsed but violates the bank contract (too short, bad record)
    #[error("Malformed question store: {0}")]
    Malformed(String),

    /// No question at the requested position
    #[error("Question {index} not found (bank holds {len})")]
    NotFound { index: usize, len: usize },

    /// An edit would produce an invalid record
    #[error("Validation error: {0}")]
    Validation(String),
}

impl StorageError {
    /// True if the stored data itself is unusable and should be replaced by
    /// a default bank.
    ///
    /// A missing file counts as unusable data. Other I/O failures (for
    /// example a permission error) do not: overwriting the file could
    /// destroy a bank that is merely unreadable right now.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::Serialization(_) | Self::Malformed(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Self::NotFound { .. } | Self::Validation(_) => false,
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
