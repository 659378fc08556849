//! Store error types for `keygate-store`.

use keygate_core::SecretStoreError;
use thiserror::Error;

/// Errors produced by wrapper persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Core error passed through unchanged (codec failures on a
    /// corrupt record keep their distinct identity).
    #[error(transparent)]
    Core(#[from] SecretStoreError),

    /// `SQLite` database error.
    #[error("database error: {0}")]
    Database(String),

    /// Migration error during schema upgrade.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}
