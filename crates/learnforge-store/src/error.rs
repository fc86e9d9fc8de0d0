//! Store error types.

use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row does not exist or belongs to another user.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule would be violated.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous holder of the connection lock panicked.
    #[error("database connection lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Turn a UNIQUE constraint failure into [`StoreError::Conflict`].
pub(crate) fn map_unique(err: rusqlite::Error, message: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Sqlite(err),
    }
}
