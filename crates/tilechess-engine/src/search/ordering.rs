//! Move ordering: MVV-LVA captures first, then everything else in generation
//! order.

use std::cmp::Reverse;

use super::eval::piece_value;
use crate::{MoveList, Position};
use tilechess_core::{Move, Piece};

/// Lifts every capture above the non-captures, whose key is zero.
const CAPTURE_BASE: i32 = 10_000;

/// Most valuable victim, least valuable attacker.
fn mvv_lva(position: &Position, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        Piece::Pawn
    } else {
        position.tile(mv.to()).piece().unwrap_or(Piece::Pawn)
    };
    let attacker = mv.piece().piece().unwrap_or(Piece::Pawn);
    piece_value(victim) - piece_value(attacker)
}

/// Ordering key of a move; higher is searched first.
pub fn score_move(position: &Position, mv: Move) -> i32 {
    if mv.is_capture() {
        CAPTURE_BASE + mvv_lva(position, mv)
    } else {
        0
    }
}

/// Sorts `moves` best-first. The sort is stable, so non-captures (and
/// captures with equal keys) keep their generation order.
pub fn order_moves(position: &Position, moves: &mut MoveList) {
    moves
        .as_mut_slice()
        .sort_by_key(|&mv| Reverse(score_move(position, mv)));
}
