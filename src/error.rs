//! Error taxonomy for the progression core
//!
//! Every failure is recoverable by the caller. Nothing in the core
//! falls back to a "success" value when one of these occurs.

/// Errors surfaced by sessions, the engine and the store collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    /// The generator failed or returned content that could not be used
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    /// The answer oracle could not be reached or gave no verdict
    #[error("Answer oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// A concurrent award moved the ledger past the expected version
    #[error("Ledger version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// Rejected before any state was touched
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The persistence backend failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ProgressionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error is a lost race on the ledger version
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

impl From<rusqlite::Error> for ProgressionError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
