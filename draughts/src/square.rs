use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notation::NotationError;

/// Number of playable (dark) squares on an 8x8 board.
pub const SQUARE_COUNT: u8 = 32;

/// One dark square, numbered 1..=32.
///
/// Numbering runs from the top-left of the board as seen from the side
/// that moves first: square 1 is `b8`, square 4 is `h8`, square 29 is `a1`
/// and square 32 is `g1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Square(pub(crate) u8);

impl Square {
    pub fn new(index: u8) -> Result<Self, NotationError> {
        if (1..=SQUARE_COUNT).contains(&index) {
            Ok(Self(index))
        } else {
            Err(NotationError::OutOfRange(index.to_string()))
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Zero-based board row, 0 being rank 8.
    pub fn row(self) -> u8 {
        (self.0 - 1) / 4
    }

    /// Zero-based board column, 0 being file `a`.
    pub fn column(self) -> u8 {
        let slot = (self.0 - 1) % 4;
        if self.row() % 2 == 0 {
            slot * 2 + 1
        } else {
            slot * 2
        }
    }

    /// Translate an algebraic square name (`c3`) into its number.
    ///
    /// Light squares have no number and return `None`.
    pub fn from_algebraic(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let file = chars.next()?.to_ascii_lowercase();
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }

        let column = file as u8 - b'a';
        let row = b'8' - rank as u8;
        if (row + column) % 2 == 0 {
            return None;
        }
        Some(Self(row * 4 + column / 2 + 1))
    }

    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.column()) as char;
        let rank = (b'8' - self.row()) as char;
        format!("{}{}", file, rank)
    }
}

impl TryFrom<u8> for Square {
    type Error = NotationError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<Square> for u8 {
    fn from(square: Square) -> Self {
        square.0
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
