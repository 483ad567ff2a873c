//! Engine-free reply synthesis.

use async_trait::async_trait;
use draughts::Move;
use engine::EngineConnection;

use super::{MoveStrategy, ResolveRequest, StrategyFailed};

/// Played when nothing else produces a move.
pub const LAST_RESORT_MOVE: &str = "11-15";

/// Cycled through by history length when the opponent's move is unknown.
pub const OPENING_MOVES: [&str; 6] = ["11-15", "11-16", "12-16", "10-15", "9-13", "9-14"];

const ADVANCE_REPLIES: [&str; 4] = ["22-18", "21-17", "23-18", "24-19"];
const RETREAT_REPLIES: [&str; 4] = ["11-15", "12-16", "10-14", "9-13"];

pub struct HeuristicStrategy;

#[async_trait]
impl MoveStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn propose(
        &self,
        _engine: &mut EngineConnection,
        request: &ResolveRequest<'_>,
    ) -> Result<Move, StrategyFailed> {
        Ok(heuristic_move(request.opponent, request.history.len()))
    }
}

pub(super) fn last_resort() -> Move {
    Move::default()
}

/// A deterministic reply. Not a legal-move generator.
pub fn heuristic_move(opponent: Option<&Move>, history_len: usize) -> Move {
    let Some(opponent) = opponent else {
        return first_valid(&[OPENING_MOVES[history_len % OPENING_MOVES.len()]]);
    };

    let from = opponent.from().index() as i32;
    let to = opponent.to().index() as i32;
    if to > from {
        // Opponent advanced: answer around its destination.
        let mut candidates = vec![
            format!("{}-{}", to + 4, to + 8),
            format!("{}-{}", to - 4, to),
            format!("{}-{}", from - 4, from),
        ];
        candidates.extend(ADVANCE_REPLIES.iter().map(|m| m.to_string()));
        let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
        first_valid(&candidates)
    } else {
        first_valid(&RETREAT_REPLIES)
    }
}

fn first_valid(candidates: &[&str]) -> Move {
    candidates
        .iter()
        .find_map(|token| token.parse::<Move>().ok())
        .unwrap_or_else(last_resort)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(token: &str) -> Move {
        token.parse().unwrap()
    }

    #[test]
    fn test_last_resort_constant() {
        assert_eq!(last_resort().to_string(), LAST_RESORT_MOVE);
    }

    #[test]
    fn test_opening_cycle() {
        assert_eq!(heuristic_move(None, 0).to_string(), "11-15");
        assert_eq!(heuristic_move(None, 2).to_string(), "12-16");
        assert_eq!(heuristic_move(None, 5).to_string(), "9-14");
        assert_eq!(heuristic_move(None, 6).to_string(), "11-15");
    }

    #[test]
    fn test_advance_reply_keyed_off_destination() {
        assert_eq!(heuristic_move(Some(&mv("12-16")), 1).to_string(), "20-24");
    }

    #[test]
    fn test_advance_near_edge_falls_through() {
        // 30-34 is off the board; 26-30 is next.
        assert_eq!(heuristic_move(Some(&mv("25-30")), 1).to_string(), "26-30");
    }

    #[test]
    fn test_retreat_reply() {
        assert_eq!(heuristic_move(Some(&mv("22-18")), 1).to_string(), "11-15");
        assert_eq!(heuristic_move(Some(&mv("27x18")), 1).to_string(), "11-15");
    }

    #[test]
    fn test_every_reply_is_a_move_token() {
        for from in 1..=32u8 {
            for to in 1..=32u8 {
                if from == to {
                    continue;
                }
                let opponent = mv(&format!("{}-{}", from, to));
                for len in 0..7 {
                    let reply = heuristic_move(Some(&opponent), len);
                    assert!(draughts::is_move_token(&reply.to_string()));
                }
            }
        }
        for len in 0..12 {
            assert!(draughts::is_move_token(&heuristic_move(None, len).to_string()));
        }
    }
}
