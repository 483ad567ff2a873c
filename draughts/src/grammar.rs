//! Recognising move tokens inside free text.
//!
//! Engine output, log files, OCR text and clipboard contents are all
//! searched with the scanners below. They only ever accept what
//! [`parse_move`] accepts, so a token recovered from any source is
//! guaranteed to be a valid [`Move`].

use crate::notation::{format_move, parse_move, Move};
use crate::square::Square;

/// True if `token` is exactly one canonical move token.
pub fn is_move_token(token: &str) -> bool {
    match parse_move(token) {
        Ok(mv) => format_move(&mv) == token,
        Err(_) => false,
    }
}

/// All canonical tokens (`11-15`, `12x19x26`) in `text`, in order.
///
/// A token must stand on its own: `a11-15` or `2023-10-05` yield nothing.
pub fn find_move_tokens(text: &str) -> Vec<Move> {
    let bytes = text.as_bytes();
    let mut moves = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !is_run_byte(bytes[i]) {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && is_run_byte(bytes[i]) {
            i += 1;
        }
        let end = i;

        let bounded_left = start == 0 || !is_word_byte(bytes[start - 1]);
        let bounded_right = end == bytes.len() || !is_word_byte(bytes[end]);
        if !bounded_left || !bounded_right {
            continue;
        }

        // The run is pure ASCII, so slicing on its byte bounds is safe.
        let run = text[start..end].trim_matches('-');
        if run.starts_with('x') || run.ends_with('x') {
            continue;
        }
        if let Ok(mv) = parse_move(run) {
            if format_move(&mv) == run {
                moves.push(mv);
            }
        }
    }

    moves
}

pub fn first_move_token(text: &str) -> Option<Move> {
    find_move_tokens(text).into_iter().next()
}

pub fn last_move_token(text: &str) -> Option<Move> {
    find_move_tokens(text).into_iter().last()
}

/// Tokens with whitespace around the separators, as OCR tends to read
/// them: `12 - 16`, `12 x 19 x 26`.
pub fn find_spaced_moves(text: &str) -> Vec<Move> {
    let lexemes = lex(text);
    let mut moves = Vec::new();
    let mut i = 0;

    while i < lexemes.len() {
        let Lexeme::Number(first) = &lexemes[i] else {
            i += 1;
            continue;
        };
        let (Some(Lexeme::Separator(sep)), Some(Lexeme::Number(second))) =
            (lexemes.get(i + 1), lexemes.get(i + 2))
        else {
            i += 1;
            continue;
        };

        let mut token = format!("{}{}{}", first, sep, second);
        let mut next = i + 3;
        if *sep == 'x' {
            while let (Some(Lexeme::Separator('x')), Some(Lexeme::Number(hop))) =
                (lexemes.get(next), lexemes.get(next + 1))
            {
                token.push('x');
                token.push_str(hop);
                next += 2;
            }
        }

        match parse_move(&token) {
            Ok(mv) if format_move(&mv) == token => {
                moves.push(mv);
                i = next;
            }
            _ => i += 1,
        }
    }

    moves
}

/// Algebraic tokens (`c3-d4`, `c3xe5xg7`) translated to square numbers.
/// Tokens touching a light square are ignored.
pub fn find_algebraic_moves(text: &str) -> Vec<Move> {
    let bytes = text.as_bytes();
    let mut moves = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let bounded_left = i == 0 || !is_word_byte(bytes[i - 1]);
        if !bounded_left {
            i += 1;
            continue;
        }
        match read_algebraic(bytes, i) {
            Some((mv, end)) => {
                moves.push(mv);
                i = end;
            }
            None => i += 1,
        }
    }

    moves
}

fn read_algebraic(bytes: &[u8], start: usize) -> Option<(Move, usize)> {
    let mut squares: Vec<Square> = Vec::new();
    let mut pos = start;

    squares.push(algebraic_square(bytes, pos)?);
    pos += 2;

    let separator = *bytes.get(pos)?;
    if separator != b'-' && separator != b'x' {
        return None;
    }
    pos += 1;
    squares.push(algebraic_square(bytes, pos)?);
    pos += 2;

    if separator == b'x' {
        while bytes.get(pos) == Some(&b'x') {
            match algebraic_square(bytes, pos + 1) {
                Some(square) => {
                    squares.push(square);
                    pos += 3;
                }
                None => break,
            }
        }
    }

    if pos < bytes.len() && is_word_byte(bytes[pos]) {
        return None;
    }

    let from = squares[0];
    let to = squares[squares.len() - 1];
    let mv = if separator == b'-' {
        Move::step(from, to).ok()?
    } else {
        Move::jump(from, &squares[1..squares.len() - 1], to).ok()?
    };
    Some((mv, pos))
}

fn algebraic_square(bytes: &[u8], pos: usize) -> Option<Square> {
    let file = *bytes.get(pos)?;
    let rank = *bytes.get(pos + 1)?;
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    let name = [file, rank];
    Square::from_algebraic(std::str::from_utf8(&name).ok()?)
}

#[derive(Debug, PartialEq)]
enum Lexeme {
    Number(String),
    Separator(char),
    Word,
}

fn lex(text: &str) -> Vec<Lexeme> {
    let chars: Vec<char> = text.chars().collect();
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            lexemes.push(Lexeme::Number(chars[start..i].iter().collect()));
        } else if c == '-' {
            lexemes.push(Lexeme::Separator('-'));
            i += 1;
        } else if c == 'x' && stands_alone(&chars, i) {
            lexemes.push(Lexeme::Separator('x'));
            i += 1;
        } else if c.is_alphanumeric() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            lexemes.push(Lexeme::Word);
        } else {
            lexemes.push(Lexeme::Word);
            i += 1;
        }
    }

    lexemes
}

/// An `x` counts as a separator when it is not part of a word.
fn stands_alone(chars: &[char], i: usize) -> bool {
    let before = i == 0 || chars[i - 1].is_whitespace() || chars[i - 1].is_ascii_digit();
    let after =
        i + 1 == chars.len() || chars[i + 1].is_whitespace() || chars[i + 1].is_ascii_digit();
    before && after
}

fn is_run_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'-' || b == b'x'
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
