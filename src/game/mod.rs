//! Game module - rules tracking, the move oracle and the turn-sync loop
//!
//! # Module Organization
//!
//! - `types` - [`MoveSpec`], [`Side`], [`PromotionPiece`]
//! - `tracker` - [`GameTracker`], rebuilt from scraped movetext every cycle
//! - `ai` - the [`Oracle`] seam and the UCI engine behind it
//! - `turn_sync` - [`TurnSync`], the loop that ties the page and engine together
//! - `error` - [`GameError`] and the loop's [`SyncError`]
//!
//! Only `turn_sync` talks to the browser; everything else here is pure or
//! owns its own subprocess.

pub mod ai;
pub mod error;
pub mod tracker;
pub mod turn_sync;
pub mod types;

// Re-export the main entry points
pub use ai::{Oracle, OracleError, SearchResult, UciEngine};
pub use error::{GameError, GameResult, SyncError, SyncResult};
pub use tracker::{GameEnd, GameTracker};
pub use turn_sync::{GameSummary, SyncState, TurnSync};
pub use types::{MoveSpec, PromotionPiece, Side};
