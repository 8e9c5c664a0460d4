use thiserror::Error;

/// Failure inside a key-value backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("Backend lock poisoned")]
    Poisoned,
}

/// Errors surfaced by the session store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read sessions: {0}")]
    Read(#[source] BackendError),

    #[error("Stored sessions are corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    #[error("Failed to write sessions: {0}")]
    Write(#[source] BackendError),

    #[error("Failed to encode sessions: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Session not found: {0}")]
    NotFound(String),
}

impl StorageError {
    /// The stored payload could not be loaded.
    pub fn is_read_error(&self) -> bool {
        matches!(self, StorageError::Read(_) | StorageError::Corrupted(_))
    }

    /// The collection could not be written back.
    pub fn is_write_error(&self) -> bool {
        matches!(self, StorageError::Write(_) | StorageError::Encode(_))
    }
}

/// One problem found in a draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftIssue {
    #[error("session type is required")]
    MissingKind,

    #[error("location is required")]
    MissingLocation,

    #[error("game is required")]
    MissingGame,

    #[error("stakes are required")]
    MissingStakes,

    #[error("buy-in must be greater than zero")]
    BuyInNotPositive,

    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    #[error("end time is before start time")]
    EndBeforeStart,
}

/// A draft failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid session: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<DraftIssue>,
}

fn join_issues(issues: &[DraftIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
