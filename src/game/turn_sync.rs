//! Turn-sync loop - keeps the bot in step with the page, one move at a time
//!
//! # State Machine
//!
//! ```text
//! Polling -> CheckTerminal -> QueryOracle -> ReplayMove -> AwaitOpponentReply
//!    ^            |                                              |
//!    |            +--> Done                                      |
//!    +-----------------------------------------------------------+
//! ```
//!
//! - `Polling`: scrape the move log and rebuild the tracker from it
//! - `CheckTerminal`: stop once the tracker reports the game over
//! - `QueryOracle`: ask the engine for a move in the current position
//! - `ReplayMove`: click the move onto the board
//! - `AwaitOpponentReply`: block until the opponent's half of move N shows up
//!
//! A replayed move that ends the game goes straight to `Done`; the opponent
//! will never answer it.
//!
//! Exactly one surface or engine operation is in flight at any time. A new
//! move is never replayed before the opponent's reply to the previous one has
//! appeared, so a move cannot be submitted twice.
//!
//! Every error aborts the loop. Nothing is retried.

use crate::browser::{scrape_move_text, RenderSurface, UiSelectors};
use crate::game::ai::Oracle;
use crate::game::error::SyncResult;
use crate::game::tracker::{GameEnd, GameTracker};
use crate::game::types::MoveSpec;
use crate::input::{InputReplayer, InputTiming};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the loop is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Polling,
    CheckTerminal,
    QueryOracle,
    ReplayMove(MoveSpec),
    AwaitOpponentReply,
    Done,
}

/// How a finished session went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    /// Moves the bot replayed
    pub moves_played: u32,
    /// FEN of the last known position
    pub final_position: String,
    pub end: Option<GameEnd>,
    /// Polls whose move log was shorter than the one before
    pub log_regressions: u32,
}

/// Drives one game on `surface` with moves from `oracle`
pub struct TurnSync<'a, S: ?Sized, O> {
    surface: &'a S,
    oracle: &'a mut O,
    tracker: GameTracker,
    replayer: InputReplayer,
    selectors: UiSelectors,
    depth: u32,
    opponent_timeout: Option<Duration>,
    state: SyncState,
    /// Whole-move number the bot is currently playing
    move_number: u32,
    moves_played: u32,
    last_half_moves: usize,
    log_regressions: u32,
    end: Option<GameEnd>,
}

impl<'a, S, O> TurnSync<'a, S, O>
where
    S: RenderSurface + ?Sized,
    O: Oracle,
{
    pub fn new(
        surface: &'a S,
        oracle: &'a mut O,
        selectors: UiSelectors,
        timing: InputTiming,
        depth: u32,
    ) -> Self {
        Self {
            surface,
            oracle,
            tracker: GameTracker::new(),
            replayer: InputReplayer::new(selectors.clone(), timing),
            selectors,
            depth,
            opponent_timeout: None,
            state: SyncState::Polling,
            move_number: 1,
            moves_played: 0,
            last_half_moves: 0,
            log_regressions: 0,
            end: None,
        }
    }

    /// Bound the wait for each opponent reply; unbounded by default
    pub fn with_opponent_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.opponent_timeout = timeout;
        self
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn tracker(&self) -> &GameTracker {
        &self.tracker
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Run until the game is over
    pub async fn run(mut self) -> SyncResult<GameSummary> {
        info!("[SYNC] Starting turn-sync loop at depth {}", self.depth);
        while self.state != SyncState::Done {
            self.step().await?;
        }

        let summary = GameSummary {
            moves_played: self.moves_played,
            final_position: self.tracker.current_position_notation(),
            end: self.end,
            log_regressions: self.log_regressions,
        };
        match summary.end {
            Some(end) => info!("[SYNC] Game over ({}) after {} moves", end, summary.moves_played),
            None => info!("[SYNC] Stopped after {} moves", summary.moves_played),
        }
        Ok(summary)
    }

    /// Perform exactly one transition
    pub async fn step(&mut self) -> SyncResult<&SyncState> {
        let next = match self.state.clone() {
            SyncState::Polling => {
                self.poll().await?;
                SyncState::CheckTerminal
            }
            SyncState::CheckTerminal => match self.tracker.game_end() {
                Some(end) => {
                    self.end = Some(end);
                    SyncState::Done
                }
                None => SyncState::QueryOracle,
            },
            SyncState::QueryOracle => {
                let fen = self.tracker.current_position_notation();
                let result = self.oracle.best_move(&fen, self.depth).await?;
                match result.score {
                    Some(score) => info!(
                        "[SYNC] Move {} is {} ({})",
                        self.move_number, result.best_move, score
                    ),
                    None => info!("[SYNC] Move {} is {}", self.move_number, result.best_move),
                }
                SyncState::ReplayMove(result.best_move)
            }
            SyncState::ReplayMove(mv) => {
                let side = self.tracker.side_to_move();
                self.replayer.play_move(self.surface, &mv, side).await?;
                self.moves_played += 1;

                let finished = self.tracker.preview(&mv).filter(GameTracker::is_game_over);
                match finished {
                    Some(tracker) => {
                        self.end = tracker.game_end();
                        self.tracker = tracker;
                        SyncState::Done
                    }
                    None => SyncState::AwaitOpponentReply,
                }
            }
            SyncState::AwaitOpponentReply => {
                let selector = self.selectors.opponent_reply_for(self.move_number);
                debug!("[SYNC] Waiting for {}", selector);
                self.surface
                    .wait_for(&selector, self.opponent_timeout)
                    .await?;
                self.move_number += 1;
                SyncState::Polling
            }
            SyncState::Done => SyncState::Done,
        };

        self.state = next;
        Ok(&self.state)
    }

    async fn poll(&mut self) -> SyncResult<()> {
        let log = scrape_move_text(self.surface, &self.selectors.move_entry).await?;

        let half_moves = log.half_moves();
        if half_moves < self.last_half_moves {
            warn!(
                "[SYNC] Move log shrank from {} to {} half-moves",
                self.last_half_moves, half_moves
            );
            self.log_regressions += 1;
        }
        self.last_half_moves = half_moves;

        self.tracker.load_transcript(log.as_str())?;
        debug!(
            "[SYNC] {} half-moves, {:?} to move",
            self.tracker.plies(),
            self.tracker.side_to_move()
        );
        Ok(())
    }
}
