//! Storage module error types

use thiserror::Error;

/// Storage operation error type
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Job not found for this user
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Work entry not found for this user
    #[error("work entry not found: {0}")]
    EntryNotFound(String),

    /// Invalid input parameters
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Lock error when accessing database
    #[error("database lock poisoned")]
    LockError,
}

impl StorageError {
    /// Whether the error means the addressed row does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::JobNotFound(_) | Self::EntryNotFound(_))
    }
}
