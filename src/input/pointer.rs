//! Move replay - turns a [`MoveSpec`] into clicks on the rendered board
//!
//! A move is played the way a person plays it: click the source cell, click
//! the destination cell, and for a promotion pick the piece from the overlay
//! the page shows afterwards.
//!
//! # Sequence
//!
//! 1. Click the source cell centre
//! 2. Wait `select_settle` for the page to register the selection
//! 3. Click the destination cell centre
//! 4. Promotion only: wait `promotion_settle`, click the overlay entry
//! 5. Wait `commit_settle` before handing control back
//!
//! The board box is looked up again before each cell click since the page
//! may have been resized or scrolled in between.
//!
//! The delays are fixed and only paper over animation timing. A click that
//! lands before the page is ready is not detected.

use crate::board::{to_pixel, BoardAddress};
use crate::browser::{RenderSurface, SurfaceResult, UiSelectors};
use crate::game::types::{MoveSpec, Side};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Settle delays between replayed clicks, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputTiming {
    /// After the source click
    pub select_settle_ms: u64,
    /// After the destination click, before the promotion overlay click
    pub promotion_settle_ms: u64,
    /// Before returning to the caller
    pub commit_settle_ms: u64,
}

impl Default for InputTiming {
    fn default() -> Self {
        Self {
            select_settle_ms: 50,
            promotion_settle_ms: 500,
            commit_settle_ms: 100,
        }
    }
}

impl InputTiming {
    pub fn select_settle(&self) -> Duration {
        Duration::from_millis(self.select_settle_ms)
    }

    pub fn promotion_settle(&self) -> Duration {
        Duration::from_millis(self.promotion_settle_ms)
    }

    pub fn commit_settle(&self) -> Duration {
        Duration::from_millis(self.commit_settle_ms)
    }
}

/// Replays moves against a board element
#[derive(Debug, Clone)]
pub struct InputReplayer {
    selectors: UiSelectors,
    timing: InputTiming,
}

impl InputReplayer {
    pub fn new(selectors: UiSelectors, timing: InputTiming) -> Self {
        Self { selectors, timing }
    }

    /// Click `mv` onto the board
    ///
    /// `side` picks the colour of the promotion overlay entry. A missing board
    /// or overlay element fails with `TargetNotFound`; nothing is retried.
    pub async fn play_move<S>(&self, surface: &S, mv: &MoveSpec, side: Side) -> SurfaceResult<()>
    where
        S: RenderSurface + ?Sized,
    {
        debug!("[INPUT] Replaying {}", mv);

        self.click_cell(surface, mv.from).await?;
        tokio::time::sleep(self.timing.select_settle()).await;
        self.click_cell(surface, mv.to).await?;

        if let Some(piece) = mv.promotion {
            tokio::time::sleep(self.timing.promotion_settle()).await;
            let overlay = self.selectors.promotion_for(side, piece);
            debug!("[INPUT] Choosing promotion {}", overlay);
            surface.click_element(&overlay).await?;
        }

        tokio::time::sleep(self.timing.commit_settle()).await;
        Ok(())
    }

    async fn click_cell<S>(&self, surface: &S, address: BoardAddress) -> SurfaceResult<()>
    where
        S: RenderSurface + ?Sized,
    {
        let board = surface.bounding_box(&self.selectors.board).await?;
        let point = to_pixel(&board, address);
        debug!("[INPUT] Click {} at {}", address, point);
        surface.click_at(point).await
    }
}
