//! Rules-aware game model rebuilt from the scraped move list
//!
//! The browser is the source of truth for what has been played. Every poll
//! hands the full movetext to [`GameTracker::load_transcript`], which replays
//! it from the start position into a fresh `shakmaty` position and only then
//! swaps it in. Nothing is patched incrementally, so a missed poll can never
//! leave the tracker out of step with the page.
//!
//! # Game Over
//!
//! [`GameTracker::is_game_over`] covers checkmate, stalemate, insufficient
//! material, the fifty-move rule and threefold repetition.

use crate::game::error::{GameError, GameResult};
use crate::game::types::{MoveSpec, Side};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::Zobrist64;
use shakmaty::{Chess, EnPassantMode, Position};
use std::fmt;

/// Half-moves without capture or pawn move that end the game
const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of one position that end the game
const REPETITION_LIMIT: usize = 3;

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnd {
    Checkmate { winner: Side },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl fmt::Display for GameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEnd::Checkmate { winner } => write!(f, "checkmate, {winner:?} wins"),
            GameEnd::Stalemate => f.write_str("stalemate"),
            GameEnd::InsufficientMaterial => f.write_str("insufficient material"),
            GameEnd::FiftyMoveRule => f.write_str("fifty-move rule"),
            GameEnd::ThreefoldRepetition => f.write_str("threefold repetition"),
        }
    }
}

/// Game model reset wholesale from movetext each cycle
#[derive(Debug, Clone)]
pub struct GameTracker {
    position: Chess,
    /// Zobrist hash of every position reached, start position included
    history: Vec<Zobrist64>,
    plies: usize,
}

impl GameTracker {
    pub fn new() -> Self {
        let position = Chess::default();
        Self {
            history: vec![repetition_key(&position)],
            position,
            plies: 0,
        }
    }

    /// Replace the game state with the one described by `text`
    ///
    /// Accepts standard movetext (`"1. e4 e5 2. Nf3"`). Move numbers, result
    /// markers and `!`/`?` annotations are skipped. On error the previous
    /// state is kept untouched.
    pub fn load_transcript(&mut self, text: &str) -> GameResult<()> {
        let mut position = Chess::default();
        let mut history = vec![repetition_key(&position)];

        for (ply, token) in movetext_tokens(text).enumerate() {
            let malformed = |reason: String| GameError::MalformedTranscript {
                ply: ply + 1,
                token: token.to_string(),
                reason,
            };

            let san: SanPlus = token.parse().map_err(|e| malformed(format!("{e}")))?;
            let m = san
                .san
                .to_move(&position)
                .map_err(|e| malformed(format!("{e}")))?;
            position.play_unchecked(m);
            history.push(repetition_key(&position));
        }

        self.plies = history.len() - 1;
        self.position = position;
        self.history = history;
        Ok(())
    }

    pub fn is_game_over(&self) -> bool {
        self.game_end().is_some()
    }

    /// Reason the game is over, if it is
    pub fn game_end(&self) -> Option<GameEnd> {
        let pos = &self.position;
        if pos.is_checkmate() {
            let winner = Side::from(pos.turn().other());
            return Some(GameEnd::Checkmate { winner });
        }
        if pos.is_stalemate() {
            return Some(GameEnd::Stalemate);
        }
        if pos.is_insufficient_material() {
            return Some(GameEnd::InsufficientMaterial);
        }
        if pos.halfmoves() >= FIFTY_MOVE_PLIES {
            return Some(GameEnd::FiftyMoveRule);
        }
        if self.repetitions() >= REPETITION_LIMIT {
            return Some(GameEnd::ThreefoldRepetition);
        }
        None
    }

    /// Copy of this tracker with `mv` played on top
    ///
    /// `None` when the move is not legal here.
    pub fn preview(&self, mv: &MoveSpec) -> Option<GameTracker> {
        let uci: UciMove = mv.to_string().parse().ok()?;
        let m = uci.to_move(&self.position).ok()?;

        let mut next = self.clone();
        next.position.play_unchecked(m);
        next.history.push(repetition_key(&next.position));
        next.plies += 1;
        Some(next)
    }

    /// How the game would end if `mv` were played now
    pub fn end_after(&self, mv: &MoveSpec) -> Option<GameEnd> {
        self.preview(mv)?.game_end()
    }

    /// FEN of the current position
    pub fn current_position_notation(&self) -> String {
        position_fen(&self.position)
    }

    pub fn side_to_move(&self) -> Side {
        Side::from(self.position.turn())
    }

    /// Half-moves played so far
    pub fn plies(&self) -> usize {
        self.plies
    }

    fn repetitions(&self) -> usize {
        match self.history.last() {
            Some(current) => self.history.iter().filter(|key| *key == current).count(),
            None => 0,
        }
    }
}

impl Default for GameTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// SAN tokens of a movetext, in order
///
/// Move numbers may stand alone (`"12."`, `"12..."`) or be glued to the
/// move (`"12.Nf3"`).
pub fn movetext_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace().filter_map(|raw| {
        let token = strip_move_number(raw).trim_end_matches(['!', '?']);
        if token.is_empty() || RESULT_TOKENS.contains(&token) {
            None
        } else {
            Some(token)
        }
    })
}

fn strip_move_number(token: &str) -> &str {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() != token.len() && rest.starts_with('.') {
        rest.trim_start_matches('.')
    } else {
        token
    }
}

fn position_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Identity of a position for repetition counting; move counters excluded
fn repetition_key(position: &Chess) -> Zobrist64 {
    position.zobrist_hash(EnPassantMode::Legal)
}
