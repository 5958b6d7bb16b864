//! Error types for game module
//!
//! Covers the rules tracker and the turn-sync loop. Every variant of
//! [`SyncError`] is fatal to the session: the loop never retries.

use crate::browser::SurfaceError;
use crate::game::ai::OracleError;

/// Errors raised by the rules tracker
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Scraped movetext could not be replayed from the start position
    #[error("Malformed transcript at ply {ply} ({token:?}): {reason}")]
    MalformedTranscript {
        ply: usize,
        token: String,
        reason: String,
    },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors that abort the turn-sync loop
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Result type alias for loop operations
pub type SyncResult<T> = Result<T, SyncError>;
