//! Move-list scraper
//!
//! Re-reads the whole move list on every call. Returning the full transcript
//! rather than a delta lets the tracker rebuild from scratch each cycle.

use super::{RenderSurface, SurfaceResult};
use crate::game::tracker::movetext_tokens;
use std::fmt;
use tracing::debug;

/// Full movetext of the game so far, as rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveLogText(String);

impl MoveLogText {
    /// Join entries the way the page reads: child texts by a single space,
    /// then entries by a single space
    pub fn from_entries(entries: &[Vec<String>]) -> Self {
        let text = entries
            .iter()
            .map(|children| children.join(" "))
            .collect::<Vec<_>>()
            .join(" ");
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of half-moves in the text
    pub fn half_moves(&self) -> usize {
        movetext_tokens(&self.0).count()
    }
}

impl fmt::Display for MoveLogText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read every move entry in document order and join them into one movetext
pub async fn scrape_move_text<S>(surface: &S, entry_selector: &str) -> SurfaceResult<MoveLogText>
where
    S: RenderSurface + ?Sized,
{
    let entries = surface.move_entries(entry_selector).await?;
    let text = MoveLogText::from_entries(&entries);
    debug!(
        "[SCRAPE] {} entries, {} half-moves: {:?}",
        entries.len(),
        text.half_moves(),
        text.as_str()
    );
    Ok(text)
}
