//! The line protocol spoken on the engine's stdin/stdout.
//!
//! Requests are three lines at most:
//!
//! ```text
//! position <position token>
//! move <opponent move>        (only when known)
//! go
//! ```
//!
//! Replies are free text; the first move token on a line is the answer.

use draughts::{first_move_token, Move};

pub fn format_request(position: &str, opponent: Option<&Move>) -> String {
    let mut cmd = format!("position {}\n", position);
    if let Some(mv) = opponent {
        cmd.push_str(&format!("move {}\n", mv));
    }
    cmd.push_str("go\n");
    cmd
}

pub fn parse_reply_line(line: &str) -> Option<Move> {
    first_move_token(line)
}
