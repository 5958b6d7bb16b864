//! Move oracle - the external engine that picks the bot's moves
//!
//! The engine runs as a UCI subprocess started once per session and reused
//! for every move. Each call is one request/response exchange: set the
//! position, search to a fixed depth, read back `bestmove`.
//!
//! # Architecture
//!
//! - [`Oracle`]: what the turn-sync loop needs from an engine
//! - [`UciEngine`]: UCI over any async byte stream; [`UciEngine::spawn`] wires
//!   it to a child process
//! - [`search`]: result types and output-line parsing
//!
//! Depth is the only stopping criterion. Any protocol failure is fatal to the
//! session; there is no reconnect.

use async_trait::async_trait;
use std::path::PathBuf;

pub mod search;
pub mod uci;

// Re-export for convenience
pub use search::{Score, SearchResult};
pub use uci::UciEngine;

/// Errors raised while talking to the engine
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The engine process could not be started
    #[error("Failed to start engine {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the engine failed
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine closed its output
    #[error("Engine connection lost")]
    ConnectionLost,

    /// The engine answered with something that is not valid protocol
    #[error("Malformed engine response: {line:?}")]
    MalformedResponse { line: String },

    /// The engine found no legal move in the position
    #[error("Engine returned no move")]
    NoMove,
}

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// A source of best moves for a position
#[async_trait]
pub trait Oracle: Send {
    /// Best move for the FEN `position`, searched to exactly `depth` plies
    async fn best_move(&mut self, position: &str, depth: u32) -> OracleResult<SearchResult>;
}
