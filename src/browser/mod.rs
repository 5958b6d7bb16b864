//! Rendering surface - the live page the bot reads from and clicks on
//!
//! Everything the turn-sync loop needs from the browser goes through the
//! [`RenderSurface`] trait, so the loop can run against Chrome in production
//! and against a scripted surface in tests.
//!
//! # Markup Contract
//!
//! The page markup is a fixed external contract. [`UiSelectors`] holds the
//! selectors for it:
//!
//! - **Board**: the element whose bounding box is the 8x8 grid
//! - **Move entries**: one element per full move, children are its text parts
//! - **Promotion overlay**: one element per piece, keyed by colour + letter
//! - **Opponent reply**: appears once Black's half of move N is on the list
//! - **Start button**: footer button whose title starts the game

pub mod chrome;
pub mod move_log;

use crate::board::{BoardBox, PixelPoint};
use crate::game::types::{PromotionPiece, Side};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use chrome::ChromeSurface;
pub use move_log::{scrape_move_text, MoveLogText};

/// Errors raised by rendering-surface operations
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// No element matches the selector
    #[error("Target not found: {selector}")]
    TargetNotFound { selector: String },

    /// A bounded wait ran out before the element appeared
    #[error("Timed out after {waited:?} waiting for {selector}")]
    Timeout { selector: String, waited: Duration },

    /// A page script returned something other than what was asked for
    #[error("Unexpected script result: {0}")]
    Script(#[from] serde_json::Error),

    /// The browser or launch configuration was rejected before any CDP traffic
    #[error("Browser configuration error: {message}")]
    Config { message: String },

    /// The browser connection itself failed
    #[error("Browser error: {0}")]
    Backend(#[from] chromiumoxide::error::CdpError),
}

/// Result type alias for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Query and input capabilities of a rendered page
///
/// One operation is in flight at a time; implementations need no locking of
/// their own beyond what `&self` access requires.
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Current viewport bounding box of the unique element matching `selector`
    async fn bounding_box(&self, selector: &str) -> SurfaceResult<BoardBox>;

    /// Text content of every child node of every matching element, in
    /// document order
    async fn move_entries(&self, selector: &str) -> SurfaceResult<Vec<Vec<String>>>;

    /// Primary-button click at a viewport point
    async fn click_at(&self, point: PixelPoint) -> SurfaceResult<()>;

    /// Primary-button click on the element matching `selector`
    async fn click_element(&self, selector: &str) -> SurfaceResult<()>;

    /// Block until an element matching `selector` exists
    ///
    /// `None` waits forever.
    async fn wait_for(&self, selector: &str, timeout: Option<Duration>) -> SurfaceResult<()>;
}

/// Selectors for the page markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSelectors {
    pub board: String,
    pub move_entry: String,
    /// Overlay entry; `{color}` and `{piece}` are replaced by letter codes
    pub promotion_piece: String,
    /// Opponent reply marker; `{n}` is replaced by the full-move number
    pub opponent_reply: String,
    pub start_button: String,
    pub start_button_title: String,
}

impl Default for UiSelectors {
    fn default() -> Self {
        Self {
            board: "chess-board".to_string(),
            move_entry: ".move".to_string(),
            promotion_piece: ".promotion-piece.{color}{piece}".to_string(),
            opponent_reply: r#"[data-whole-move-number="{n}"] > .black"#.to_string(),
            start_button: ".selection-menu-footer > button".to_string(),
            start_button_title: "Play".to_string(),
        }
    }
}

impl UiSelectors {
    /// Overlay entry for promoting `side`'s pawn to `piece`
    pub fn promotion_for(&self, side: Side, piece: PromotionPiece) -> String {
        self.promotion_piece
            .replace("{color}", &side.code().to_string())
            .replace("{piece}", &piece.code().to_string())
    }

    /// Marker that Black's half of full move `move_number` is on the list
    pub fn opponent_reply_for(&self, move_number: u32) -> String {
        self.opponent_reply.replace("{n}", &move_number.to_string())
    }
}
