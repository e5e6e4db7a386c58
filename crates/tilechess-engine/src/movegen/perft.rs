//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree at a given depth,
//! together with how many of the moves reaching them were captures, en
//! passant captures, castles, promotions and checks. The totals can be
//! compared against published reference values.

use std::ops::AddAssign;

use super::{generate_moves, is_king_attacked, MoveList};
use crate::Position;
use tilechess_core::Move;

/// Leaf tallies of a perft run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftStats {
    pub nodes: u64,
    pub captures: u64,
    pub en_passants: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
}

impl AddAssign for PerftStats {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passants += rhs.en_passants;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
    }
}

/// Walks the legal move tree to `depth` plies and tallies its leaves.
///
/// The position is mutated in place and restored before returning.
pub fn perft(position: &mut Position, depth: u32) -> PerftStats {
    let mut stats = PerftStats::default();
    if depth == 0 {
        stats.nodes = 1;
        return stats;
    }

    let mut moves = MoveList::new();
    generate_moves(position, &mut moves);
    let mover = position.turn();

    for &mv in &moves {
        if position.apply_move(mv).is_err() {
            continue;
        }
        if !is_king_attacked(position, mover) {
            if depth == 1 {
                tally_leaf(position, mv, &mut stats);
            } else {
                stats += perft(position, depth - 1);
            }
        }
        let reverted = position.revert_move(mv);
        debug_assert!(reverted.is_ok());
    }
    stats
}

fn tally_leaf(position: &Position, mv: Move, stats: &mut PerftStats) {
    stats.nodes += 1;
    if mv.is_capture() {
        stats.captures += 1;
    }
    if mv.is_en_passant() {
        stats.en_passants += 1;
    }
    if mv.is_castle() {
        stats.castles += 1;
    }
    if mv.is_promotion() {
        stats.promotions += 1;
    }
    if position.in_check() {
        stats.checks += 1;
    }
}

/// Perft per legal root move, sorted by UCI notation.
/// Useful for pinning down which subtree disagrees with a reference.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    let mut moves = MoveList::new();
    position.generate_legal_moves(&mut moves);

    let mut results = Vec::with_capacity(moves.len());
    for &mv in &moves {
        if position.apply_move(mv).is_err() {
            continue;
        }
        let nodes = perft(position, depth.saturating_sub(1)).nodes;
        let reverted = position.revert_move(mv);
        debug_assert!(reverted.is_ok());
        results.push((mv, nodes));
    }

    results.sort_by_key(|(mv, _)| mv.to_uci());
    results
}
