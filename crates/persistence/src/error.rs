// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use craftsbite::RepositoryError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A table lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// The seed file could not be read.
    SeedReadFailed {
        /// The seed file path.
        path: String,
        /// The I/O error description.
        reason: String,
    },
    /// Serialization/deserialization error.
    SerializationError(String),
    /// A seeded record references something that does not exist.
    InvalidSeed(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockPoisoned(table) => write!(f, "Lock on {table} table is poisoned"),
            Self::SeedReadFailed { path, reason } => {
                write!(f, "Failed to read seed file {path}: {reason}")
            }
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InvalidSeed(msg) => write!(f, "Invalid seed: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<PersistenceError> for RepositoryError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::LockPoisoned(_) => Self::Unavailable(err.to_string()),
            PersistenceError::SeedReadFailed { .. }
            | PersistenceError::SerializationError(_)
            | PersistenceError::InvalidSeed(_) => Self::Query(err.to_string()),
        }
    }
}
