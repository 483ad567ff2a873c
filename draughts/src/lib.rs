//! Draughts move notation.
//!
//! Squares are addressed by the standard 1..=32 numbering of the dark
//! squares. Moves travel as text tokens (`11-15`, `12x19x26`) between the
//! browser client, the engine and the desktop application; everything that
//! accepts or emits a token goes through [`notation`] and [`grammar`] so the
//! acceptance rules stay identical across the bridge.

pub mod grammar;
pub mod notation;
pub mod square;

pub use grammar::{
    find_algebraic_moves, find_move_tokens, find_spaced_moves, first_move_token,
    is_move_token, last_move_token,
};
pub use notation::{format_move, parse_move, Move, MoveKind, NotationError};
pub use square::{Square, SQUARE_COUNT};
