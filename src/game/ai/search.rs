//! Search results and the engine output lines they are read from
//!
//! Lines are parsed with `vampirc_uci`; only the parts the bot uses are kept:
//!
//! - `bestmove <move> [ponder <move>]` ends a search
//! - `info ... depth <d> ... score cp <x> | score mate <n> ...` reports progress

use crate::game::types::MoveSpec;
use std::fmt;
use vampirc_uci::{UciInfoAttribute, UciMessage, UciMove};

/// Engine evaluation from the side to move's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns
    Cp(i32),
    /// Mate in `n` moves; negative when the side to move is getting mated
    Mate(i32),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Score::Mate(n) => write!(f, "#{}", n),
        }
    }
}

/// Outcome of one fixed-depth search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: MoveSpec,
    /// Expected reply, when the engine reports one
    pub ponder: Option<MoveSpec>,
    /// Last score reported before `bestmove`
    pub score: Option<Score>,
    /// Deepest depth reported before `bestmove`
    pub depth: Option<u32>,
}

impl SearchResult {
    pub fn new(best_move: MoveSpec) -> Self {
        Self {
            best_move,
            ponder: None,
            score: None,
            depth: None,
        }
    }
}

/// What a `bestmove` line carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestMoveLine {
    Move {
        best: MoveSpec,
        ponder: Option<MoveSpec>,
    },
    /// `bestmove (none)`: no legal move in the position
    NoMove,
}

/// Parse a `bestmove` line; `None` if the line is anything else or malformed
pub fn parse_bestmove(line: &str) -> Option<BestMoveLine> {
    let mut words = line.split_whitespace();
    if words.next()? != "bestmove" {
        return None;
    }
    // The UCI grammar has no rule for the null move
    if words.next()? == "(none)" {
        return Some(BestMoveLine::NoMove);
    }

    match vampirc_uci::parse_one(line) {
        UciMessage::BestMove { best_move, ponder } => Some(BestMoveLine::Move {
            best: to_move_spec(&best_move)?,
            ponder: ponder.as_ref().and_then(to_move_spec),
        }),
        _ => None,
    }
}

fn to_move_spec(mv: &UciMove) -> Option<MoveSpec> {
    mv.to_string().parse().ok()
}

/// Progress fields of an `info` line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    pub score: Option<Score>,
}

/// Parse the depth and score of an `info` line
pub fn parse_info(line: &str) -> Option<InfoLine> {
    if line.split_whitespace().next()? != "info" {
        return None;
    }

    let mut info = InfoLine::default();
    if let UciMessage::Info(attributes) = vampirc_uci::parse_one(line) {
        for attribute in attributes {
            match attribute {
                UciInfoAttribute::Depth(depth) => info.depth = Some(u32::from(depth)),
                UciInfoAttribute::Score { cp, mate, .. } => {
                    info.score = match (cp, mate) {
                        (_, Some(n)) => Some(Score::Mate(i32::from(n))),
                        (Some(cp), None) => Some(Score::Cp(cp)),
                        (None, None) => None,
                    }
                }
                _ => {}
            }
        }
    }
    Some(info)
}
