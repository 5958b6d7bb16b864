//! Scripted stand-ins for the browser and the engine
//!
//! Both record what they were asked to do into one shared [`Journal`], so
//! tests can check the order of surface and engine operations.

#![allow(dead_code)]

use async_trait::async_trait;
use board_autopilot::board::{BoardBox, PixelPoint};
use board_autopilot::browser::{RenderSurface, SurfaceError, SurfaceResult};
use board_autopilot::game::ai::{Oracle, OracleError, OracleResult, SearchResult};
use board_autopilot::game::MoveSpec;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One recorded operation
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Scrape,
    Click(PixelPoint),
    ClickElement(String),
    WaitFor(String),
    Query(String),
}

pub type Journal = Arc<Mutex<Vec<Event>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Split movetext into per-move entries the way the page renders them
pub fn entries(movetext: &str) -> Vec<Vec<String>> {
    let mut entries: Vec<Vec<String>> = Vec::new();
    for token in movetext.split_whitespace() {
        match entries.last_mut() {
            Some(entry) if !token.ends_with('.') => entry.push(token.to_string()),
            _ => entries.push(vec![token.to_string()]),
        }
    }
    entries
}

/// Page whose move list advances one scripted transcript per scrape
pub struct ScriptedSurface {
    board: Option<BoardBox>,
    transcripts: Mutex<VecDeque<String>>,
    /// Selectors `wait_for` times out on
    never_appears: Vec<String>,
    journal: Journal,
}

impl ScriptedSurface {
    /// `transcripts` are served in order; the last one repeats
    pub fn new(journal: Journal, transcripts: &[&str]) -> Self {
        Self {
            board: Some(BoardBox::new(0.0, 0.0, 800.0, 800.0)),
            transcripts: Mutex::new(transcripts.iter().map(|t| t.to_string()).collect()),
            never_appears: Vec::new(),
            journal,
        }
    }

    pub fn with_board(mut self, board: Option<BoardBox>) -> Self {
        self.board = board;
        self
    }

    pub fn never_appears(mut self, selector: &str) -> Self {
        self.never_appears.push(selector.to_string());
        self
    }

    fn record(&self, event: Event) {
        self.journal.lock().push(event);
    }
}

#[async_trait]
impl RenderSurface for ScriptedSurface {
    async fn bounding_box(&self, selector: &str) -> SurfaceResult<BoardBox> {
        self.board.ok_or_else(|| SurfaceError::TargetNotFound {
            selector: selector.to_string(),
        })
    }

    async fn move_entries(&self, _selector: &str) -> SurfaceResult<Vec<Vec<String>>> {
        self.record(Event::Scrape);
        let mut transcripts = self.transcripts.lock();
        let text = if transcripts.len() > 1 {
            transcripts.pop_front().unwrap_or_default()
        } else {
            transcripts.front().cloned().unwrap_or_default()
        };
        Ok(entries(&text))
    }

    async fn click_at(&self, point: PixelPoint) -> SurfaceResult<()> {
        self.record(Event::Click(point));
        Ok(())
    }

    async fn click_element(&self, selector: &str) -> SurfaceResult<()> {
        self.record(Event::ClickElement(selector.to_string()));
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Option<Duration>) -> SurfaceResult<()> {
        self.record(Event::WaitFor(selector.to_string()));
        if self.never_appears.iter().any(|s| s == selector) {
            let waited = timeout.unwrap_or(Duration::MAX);
            tokio::time::sleep(waited).await;
            return Err(SurfaceError::Timeout {
                selector: selector.to_string(),
                waited,
            });
        }
        Ok(())
    }
}

/// Engine that answers with a fixed list of moves
pub struct ScriptedOracle {
    moves: VecDeque<MoveSpec>,
    journal: Journal,
}

impl ScriptedOracle {
    pub fn new(journal: Journal, moves: &[&str]) -> Self {
        Self {
            moves: moves.iter().map(|m| m.parse().unwrap()).collect(),
            journal,
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn best_move(&mut self, position: &str, _depth: u32) -> OracleResult<SearchResult> {
        self.journal.lock().push(Event::Query(position.to_string()));
        self.moves
            .pop_front()
            .map(SearchResult::new)
            .ok_or(OracleError::NoMove)
    }
}

/// Centre of a cell on the 800x800 board at the origin
pub fn cell(address: &str) -> PixelPoint {
    let address = address.parse().unwrap();
    board_autopilot::board::to_pixel(&BoardBox::new(0.0, 0.0, 800.0, 800.0), address)
}
