use thiserror::Error;

use crate::engine::{PlayError, SnapshotError};

/// Errors from the game host and its save store.
#[derive(Debug, Error)]
pub enum HostError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A saved document that cannot be turned back into a game.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The engine refused the call; nothing was changed or saved.
    #[error(transparent)]
    Play(#[from] PlayError),

    /// Returned when a game id is not known to the store.
    #[error("game not found: {0}")]
    NotFound(String),

    /// Returned when a save record has an unexpected schema version.
    #[error("schema mismatch for game {id}: expected {expected}, got {found}")]
    SchemaMismatch { id: String, expected: u8, found: u8 },
}

impl HostError {
    /// The engine's error code, if this is a refused play.
    pub fn play_code(&self) -> Option<&'static str> {
        match self {
            HostError::Play(e) => Some(e.code()),
            _ => None,
        }
    }
}
