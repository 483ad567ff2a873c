//! Move tokens: parsing and formatting.
//!
//! A simple move renders as `from-to`. A jump renders as
//! `from x hop x ... x to`, without spaces: `12x19x26` is a double jump
//! from 12 landing on 19 and then on 26.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::square::Square;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("Empty move token")]
    Empty,
    #[error("Wrong number of fields in move token: {0}")]
    FieldCount(String),
    #[error("Non-numeric field in move token: {0}")]
    NotNumeric(String),
    #[error("Square out of range: {0}")]
    OutOfRange(String),
    #[error("Mixed separators in move token: {0}")]
    MixedSeparators(String),
    #[error("Move does not leave its square: {0}")]
    DegenerateHop(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// One diagonal step, written with `-`.
    Step,
    /// One or more jumps, written with `x`.
    Jump,
}

/// A single move. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    from: Square,
    to: Square,
    captures: SmallVec<[Square; 4]>,
    kind: MoveKind,
}

impl Move {
    pub fn step(from: Square, to: Square) -> Result<Self, NotationError> {
        let mv = Self {
            from,
            to,
            captures: SmallVec::new(),
            kind: MoveKind::Step,
        };
        mv.check()?;
        Ok(mv)
    }

    /// Build a jump. `captures` are the intermediate landing squares in
    /// order; `to` is the final one.
    pub fn jump(from: Square, captures: &[Square], to: Square) -> Result<Self, NotationError> {
        let mv = Self {
            from,
            to,
            captures: SmallVec::from_slice(captures),
            kind: MoveKind::Jump,
        };
        mv.check()?;
        Ok(mv)
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn captures(&self) -> &[Square] {
        &self.captures
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    pub fn is_capture(&self) -> bool {
        self.kind == MoveKind::Jump
    }

    /// Every square the piece lands on after leaving `from`, ending with `to`.
    pub fn landing_squares(&self) -> Vec<Square> {
        let mut squares: Vec<Square> = self.captures.to_vec();
        squares.push(self.to);
        squares
    }

    fn check(&self) -> Result<(), NotationError> {
        if self.from == self.to {
            return Err(NotationError::DegenerateHop(format_move(self)));
        }
        let mut previous = self.from;
        for square in self.landing_squares() {
            if square == previous {
                return Err(NotationError::DegenerateHop(format_move(self)));
            }
            previous = square;
        }
        Ok(())
    }
}

/// Parse a move token (`11-15`, `18x25`, `12x19x26`).
pub fn parse_move(token: &str) -> Result<Move, NotationError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(NotationError::Empty);
    }

    let mut fields: Vec<&str> = Vec::new();
    let mut separators: Vec<char> = Vec::new();
    let mut start = 0;
    for (i, c) in token.char_indices() {
        if c == '-' || c == 'x' {
            fields.push(&token[start..i]);
            separators.push(c);
            start = i + c.len_utf8();
        }
    }
    fields.push(&token[start..]);

    if fields.len() < 2 {
        return Err(NotationError::FieldCount(token.to_string()));
    }

    let kind = match separators[0] {
        '-' => MoveKind::Step,
        _ => MoveKind::Jump,
    };
    if separators.iter().any(|&c| c != separators[0]) {
        return Err(NotationError::MixedSeparators(token.to_string()));
    }
    if kind == MoveKind::Step && fields.len() != 2 {
        return Err(NotationError::FieldCount(token.to_string()));
    }

    let squares = fields
        .iter()
        .map(|field| parse_field(field))
        .collect::<Result<Vec<_>, _>>()?;

    let from = squares[0];
    let to = squares[squares.len() - 1];
    match kind {
        MoveKind::Step => Move::step(from, to),
        MoveKind::Jump => Move::jump(from, &squares[1..squares.len() - 1], to),
    }
}

fn parse_field(field: &str) -> Result<Square, NotationError> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NotationError::NotNumeric(field.to_string()));
    }
    // Leading zeros would not survive a format round trip.
    if field.starts_with('0') {
        return Err(NotationError::OutOfRange(field.to_string()));
    }
    let index: u8 = field
        .parse()
        .map_err(|_| NotationError::NotNumeric(field.to_string()))?;
    Square::new(index)
}

/// Format a move as a token.
pub fn format_move(mv: &Move) -> String {
    match mv.kind {
        MoveKind::Step => format!("{}-{}", mv.from, mv.to),
        MoveKind::Jump => {
            let mut s = mv.from.to_string();
            for square in mv.captures.iter().chain(std::iter::once(&mv.to)) {
                s.push('x');
                s.push_str(&square.to_string());
            }
            s
        }
    }
}

/// `11-15`, Black's most common first move.
impl Default for Move {
    fn default() -> Self {
        Self {
            from: Square(11),
            to: Square(15),
            captures: SmallVec::new(),
            kind: MoveKind::Step,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_move(self))
    }
}

impl FromStr for Move {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_move(s)
    }
}

impl TryFrom<String> for Move {
    type Error = NotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_move(&value)
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> Self {
        format_move(&mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(n: u8) -> Square {
        Square::new(n).unwrap()
    }

    #[test]
    fn test_parse_simple_move() {
        let mv = parse_move("11-15").unwrap();
        assert_eq!(mv.from(), sq(11));
        assert_eq!(mv.to(), sq(15));
        assert!(mv.captures().is_empty());
        assert_eq!(mv.kind(), MoveKind::Step);
    }

    #[test]
    fn test_parse_double_jump() {
        let mv = parse_move("12x19x26").unwrap();
        assert_eq!(mv.from(), sq(12));
        assert_eq!(mv.to(), sq(26));
        assert_eq!(mv.captures(), &[sq(19)]);
        assert_eq!(format_move(&mv), "12x19x26");
    }

    #[test]
    fn test_single_jump_keeps_its_separator() {
        let mv = parse_move("18x25").unwrap();
        assert!(mv.is_capture());
        assert!(mv.captures().is_empty());
        assert_eq!(mv.to_string(), "18x25");
    }

    #[test]
    fn test_default_move() {
        assert_eq!(Move::default().to_string(), "11-15");
    }

    #[test]
    fn test_landing_squares() {
        let mv = parse_move("1x10x19x28").unwrap();
        assert_eq!(mv.landing_squares(), vec![sq(10), sq(19), sq(28)]);
        let mv = parse_move("9-13").unwrap();
        assert_eq!(mv.landing_squares(), vec![sq(13)]);
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(parse_move(""), Err(NotationError::Empty));
        assert!(matches!(parse_move("12"), Err(NotationError::FieldCount(_))));
        assert!(matches!(parse_move("1-2-3"), Err(NotationError::FieldCount(_))));
        assert!(matches!(parse_move("ab-12"), Err(NotationError::NotNumeric(_))));
        assert!(matches!(parse_move("12-"), Err(NotationError::NotNumeric(_))));
        assert!(matches!(parse_move("12-33"), Err(NotationError::OutOfRange(_))));
        assert!(matches!(parse_move("0-4"), Err(NotationError::OutOfRange(_))));
        assert!(matches!(parse_move("05-09"), Err(NotationError::OutOfRange(_))));
        assert!(matches!(parse_move("12-16x20"), Err(NotationError::MixedSeparators(_))));
        assert!(matches!(parse_move("12x19-26"), Err(NotationError::MixedSeparators(_))));
        assert!(matches!(parse_move("12-12"), Err(NotationError::DegenerateHop(_))));
        assert!(matches!(parse_move("12x19x19"), Err(NotationError::DegenerateHop(_))));
    }

    #[test]
    fn test_move_serde_as_token() {
        let mv = parse_move("12x19x26").unwrap();
        let json = serde_json::to_string(&mv).unwrap();
        assert_eq!(json, "\"12x19x26\"");
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
        assert!(serde_json::from_str::<Move>("\"99-1\"").is_err());
    }
}
