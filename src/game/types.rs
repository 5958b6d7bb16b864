//! Move and side types shared by the replayer, the tracker and the oracle
//!
//! Long-algebraic tokens (`e2e4`, `e7e8q`) are the interchange form between
//! the engine and the click replay layer, so they get a typed representation
//! here instead of being sliced as strings at every call site.

use crate::board::{BoardAddress, ParseAddressError};
use std::fmt;
use std::str::FromStr;

/// Errors produced when parsing a long-algebraic move token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMoveError {
    /// Token is not 4 or 5 characters long
    #[error("Move token must be 4 or 5 characters, got {0:?}")]
    Length(String),

    /// Source or destination cell is malformed
    #[error("Invalid cell in move token: {0}")]
    Address(#[from] ParseAddressError),

    /// Fifth character does not name a promotion piece
    #[error("Invalid promotion piece {0:?} (expected one of q, r, b, n)")]
    Promotion(char),
}

/// Piece a pawn can promote to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    /// Read the lowercase letter code used by long-algebraic tokens
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'q' => Some(PromotionPiece::Queen),
            'r' => Some(PromotionPiece::Rook),
            'b' => Some(PromotionPiece::Bishop),
            'n' => Some(PromotionPiece::Knight),
            _ => None,
        }
    }

    /// Lowercase letter code (`q`, `r`, `b`, `n`)
    pub fn code(self) -> char {
        match self {
            PromotionPiece::Queen => 'q',
            PromotionPiece::Rook => 'r',
            PromotionPiece::Bishop => 'b',
            PromotionPiece::Knight => 'n',
        }
    }
}

/// Player colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Side {
    /// Single-letter colour code used by the promotion overlay markup
    pub fn code(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

/// A move as source cell, destination cell and optional promotion
///
/// # Examples
///
/// ```rust
/// use board_autopilot::game::types::{MoveSpec, PromotionPiece};
///
/// let mv: MoveSpec = "e7e8q".parse().unwrap();
/// assert_eq!(mv.from.to_string(), "e7");
/// assert_eq!(mv.to.to_string(), "e8");
/// assert_eq!(mv.promotion, Some(PromotionPiece::Queen));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveSpec {
    pub from: BoardAddress,
    pub to: BoardAddress,
    pub promotion: Option<PromotionPiece>,
}

impl MoveSpec {
    /// Parse a 4- or 5-character long-algebraic token
    pub fn from_long_algebraic(token: &str) -> Result<Self, ParseMoveError> {
        if !token.is_ascii() || !(4..=5).contains(&token.len()) {
            return Err(ParseMoveError::Length(token.to_string()));
        }

        let from = BoardAddress::from_algebraic(&token[0..2])?;
        let to = BoardAddress::from_algebraic(&token[2..4])?;
        let promotion = match token[4..].chars().next() {
            Some(code) => {
                Some(PromotionPiece::from_code(code).ok_or(ParseMoveError::Promotion(code))?)
            }
            None => None,
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl FromStr for MoveSpec {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_long_algebraic(s)
    }
}

impl fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.code())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_char_token_has_no_promotion() {
        let mv = MoveSpec::from_long_algebraic("e2e4").unwrap();
        assert_eq!(mv.from, "e2".parse().unwrap());
        assert_eq!(mv.to, "e4".parse().unwrap());
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn test_five_char_token_keeps_promotion_code() {
        let mv: MoveSpec = "e7e8q".parse().unwrap();
        assert_eq!(mv.promotion.map(PromotionPiece::code), Some('q'));

        let under: MoveSpec = "b2a1n".parse().unwrap();
        assert_eq!(under.promotion, Some(PromotionPiece::Knight));
    }

    #[test]
    fn test_display_is_the_token() {
        for token in ["e2e4", "g1f3", "e7e8q", "a2a1r"] {
            assert_eq!(token.parse::<MoveSpec>().unwrap().to_string(), token);
        }
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            MoveSpec::from_long_algebraic("e2"),
            Err(ParseMoveError::Length(_))
        ));
        assert!(matches!(
            MoveSpec::from_long_algebraic("e2e4qq"),
            Err(ParseMoveError::Length(_))
        ));
        assert_eq!(
            MoveSpec::from_long_algebraic("e7e8k"),
            Err(ParseMoveError::Promotion('k'))
        );
        assert!(matches!(
            MoveSpec::from_long_algebraic("z2e4"),
            Err(ParseMoveError::Address(ParseAddressError::File('z')))
        ));
        assert!(matches!(
            MoveSpec::from_long_algebraic("(none)"),
            Err(ParseMoveError::Length(_))
        ));
    }

    #[test]
    fn test_side_codes() {
        assert_eq!(Side::White.code(), 'w');
        assert_eq!(Side::Black.code(), 'b');
        assert_eq!(Side::from(shakmaty::Color::Black), Side::Black);
    }
}
