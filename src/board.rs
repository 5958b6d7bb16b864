//! Board geometry - algebraic cell addresses to viewport pixels
//!
//! The rendered board is treated as an 8x8 grid laid over its on-screen
//! bounding box. Every conversion takes the box as an argument because the
//! page can be resized or scrolled between two clicks.
//!
//! # Coordinate System
//!
//! - **Algebraic**: `"e4"` - file letter `a..h`, rank digit `1..8`
//! - **Grid**: `file` 0-7 left to right, `rank` 0-7 top to bottom
//! - **Viewport**: pixel `(x, y)` of the cell centre
//!
//! The grid assumes White is drawn at the bottom, so rank `"1"` is grid row 7.
//! A flipped board (playing Black) would need the mirror of this mapping.

use std::fmt;
use std::str::FromStr;

/// Number of cells along each side of the board
pub const BOARD_CELLS: u8 = 8;

/// Errors produced when reading an algebraic cell address
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAddressError {
    #[error("Cell address must be two characters, got {0:?}")]
    Length(String),

    #[error("Invalid file {0:?} (expected a-h)")]
    File(char),

    #[error("Invalid rank {0:?} (expected 1-8)")]
    Rank(char),
}

/// A board cell on the top-left-origin grid
///
/// `rank` is the visual row index as currently oriented: 0 is the topmost
/// row (algebraic rank 8), 7 the bottom row (algebraic rank 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardAddress {
    pub file: u8,
    pub rank: u8,
}

impl BoardAddress {
    /// Create an address from grid indices (both 0-7)
    pub fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < BOARD_CELLS && rank < BOARD_CELLS);
        Self { file, rank }
    }

    /// Read a two-character algebraic address such as `"e4"`
    ///
    /// file = letter - 'a', rank = 8 - digit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use board_autopilot::board::BoardAddress;
    ///
    /// let e2 = BoardAddress::from_algebraic("e2").unwrap();
    /// assert_eq!((e2.file, e2.rank), (4, 6));
    /// ```
    pub fn from_algebraic(s: &str) -> Result<Self, ParseAddressError> {
        let mut chars = s.chars();
        let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(ParseAddressError::Length(s.to_string()));
        };

        let file = match file_char {
            'a'..='h' => file_char as u8 - b'a',
            other => return Err(ParseAddressError::File(other)),
        };
        let rank = match rank_char {
            '1'..='8' => BOARD_CELLS - (rank_char as u8 - b'0'),
            other => return Err(ParseAddressError::Rank(other)),
        };

        Ok(Self { file, rank })
    }

    /// Algebraic form of this address (`"e4"`)
    pub fn to_algebraic(self) -> String {
        self.to_string()
    }
}

impl FromStr for BoardAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_algebraic(s)
    }
}

impl fmt::Display for BoardAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file) as char,
            BOARD_CELLS - self.rank
        )
    }
}

/// On-screen bounding box of the rendered board, in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoardBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Same box moved by `(dx, dy)`
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    fn cell_size(&self) -> (f64, f64) {
        (
            self.width / BOARD_CELLS as f64,
            self.height / BOARD_CELLS as f64,
        )
    }
}

/// A point in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Centre pixel of `address` inside `board`
///
/// `x = box.x + (width/8)*file + width/16`, and the same for `y` with `rank`.
pub fn to_pixel(board: &BoardBox, address: BoardAddress) -> PixelPoint {
    let (cell_w, cell_h) = board.cell_size();
    PixelPoint {
        x: board.x + cell_w * address.file as f64 + cell_w / 2.0,
        y: board.y + cell_h * address.rank as f64 + cell_h / 2.0,
    }
}

/// Cell containing `point`, or `None` when the point lies outside the board
pub fn from_pixel(board: &BoardBox, point: PixelPoint) -> Option<BoardAddress> {
    let (cell_w, cell_h) = board.cell_size();
    if cell_w <= 0.0 || cell_h <= 0.0 {
        return None;
    }

    let col = ((point.x - board.x) / cell_w).floor();
    let row = ((point.y - board.y) / cell_h).floor();
    let range = 0.0..BOARD_CELLS as f64;
    if range.contains(&col) && range.contains(&row) {
        Some(BoardAddress::new(col as u8, row as u8))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_addresses() -> impl Iterator<Item = String> {
        ('a'..='h').flat_map(|f| ('1'..='8').map(move |r| format!("{f}{r}")))
    }

    #[test]
    fn test_algebraic_to_grid() {
        let a8 = BoardAddress::from_algebraic("a8").unwrap();
        assert_eq!((a8.file, a8.rank), (0, 0));

        let h1 = BoardAddress::from_algebraic("h1").unwrap();
        assert_eq!((h1.file, h1.rank), (7, 7));

        let e4: BoardAddress = "e4".parse().unwrap();
        assert_eq!((e4.file, e4.rank), (4, 4));
    }

    #[test]
    fn test_invalid_addresses_rejected() {
        assert_eq!(
            BoardAddress::from_algebraic("i1"),
            Err(ParseAddressError::File('i'))
        );
        assert_eq!(
            BoardAddress::from_algebraic("a9"),
            Err(ParseAddressError::Rank('9'))
        );
        assert!(matches!(
            BoardAddress::from_algebraic("e"),
            Err(ParseAddressError::Length(_))
        ));
        assert!(matches!(
            BoardAddress::from_algebraic("e44"),
            Err(ParseAddressError::Length(_))
        ));
    }

    #[test]
    fn test_display_matches_input() {
        for name in all_addresses() {
            let address = BoardAddress::from_algebraic(&name).unwrap();
            assert_eq!(address.to_algebraic(), name);
        }
    }

    #[test]
    fn test_pixel_centres_on_800px_board() {
        let board = BoardBox::new(0.0, 0.0, 800.0, 800.0);

        let e2 = to_pixel(&board, "e2".parse().unwrap());
        assert_eq!(e2, PixelPoint::new(450.0, 650.0));

        let e4 = to_pixel(&board, "e4".parse().unwrap());
        assert_eq!(e4, PixelPoint::new(450.0, 450.0));

        let a8 = to_pixel(&board, "a8".parse().unwrap());
        assert_eq!(a8, PixelPoint::new(50.0, 50.0));
    }

    #[test]
    fn test_pixel_round_trip_recovers_every_cell() {
        let board = BoardBox::new(132.5, 87.0, 640.0, 640.0);
        for name in all_addresses() {
            let address = BoardAddress::from_algebraic(&name).unwrap();
            let point = to_pixel(&board, address);
            assert_eq!(from_pixel(&board, point), Some(address), "cell {name}");
        }
    }

    #[test]
    fn test_translation_moves_points_by_same_offset() {
        let board = BoardBox::new(10.0, 20.0, 480.0, 480.0);
        let moved = board.translated(33.0, -7.0);
        for name in all_addresses() {
            let address = BoardAddress::from_algebraic(&name).unwrap();
            let before = to_pixel(&board, address);
            let after = to_pixel(&moved, address);
            assert_eq!(after.x - before.x, 33.0);
            assert_eq!(after.y - before.y, -7.0);
        }
    }

    #[test]
    fn test_non_square_box() {
        let board = BoardBox::new(0.0, 0.0, 800.0, 400.0);
        let h1 = to_pixel(&board, "h1".parse().unwrap());
        assert_eq!(h1, PixelPoint::new(750.0, 375.0));
    }

    #[test]
    fn test_points_outside_board() {
        let board = BoardBox::new(100.0, 100.0, 800.0, 800.0);
        assert_eq!(from_pixel(&board, PixelPoint::new(99.0, 150.0)), None);
        assert_eq!(from_pixel(&board, PixelPoint::new(150.0, 900.0)), None);
        assert_eq!(
            from_pixel(&BoardBox::new(0.0, 0.0, 0.0, 0.0), PixelPoint::new(0.0, 0.0)),
            None
        );
    }
}
