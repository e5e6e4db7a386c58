//! Fixed-depth alpha-beta search.
//!
//! The search runs negamax with alpha-beta pruning over legal moves,
//! ordered by [`ordering::order_moves`], and scores leaves with
//! [`eval::evaluate`]. It always works on its own copy of the position, so
//! the caller's position is never touched.

pub mod eval;
pub mod ordering;

use crate::{JobScheduler, MoveList, Position};
use tilechess_core::Move;

use self::eval::evaluate;
use self::ordering::order_moves;

/// Score of delivering mate at the root. Mates found deeper score lower, so
/// the shortest mate wins.
pub const MATE_SCORE: i32 = 100_000;

const INFINITY: i32 = 1_000_000;

/// Result of a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// `None` when the side to move has no legal move.
    pub best_move: Option<Move>,
    /// Score from the side to move's perspective, in centipawns.
    pub score: i32,
    pub nodes: u64,
    pub depth: u8,
}

impl SearchOutcome {
    /// Returns true if the score announces a forced mate for either side.
    pub fn is_mate(&self) -> bool {
        self.score.abs() > MATE_SCORE - 1_000
    }
}

/// Search state
#[derive(Debug, Default)]
pub struct Searcher {
    nodes: u64,
}

impl Searcher {
    pub fn new() -> Self {
        Searcher::default()
    }

    /// Searches `position` to `depth` plies (at least one). The position is
    /// restored before returning.
    pub fn search(&mut self, position: &mut Position, depth: u8) -> SearchOutcome {
        let depth = depth.max(1);
        self.nodes = 0;

        let mut moves = MoveList::new();
        position.generate_legal_moves(&mut moves);
        if moves.is_empty() {
            let score = if position.in_check() { -MATE_SCORE } else { 0 };
            return SearchOutcome {
                best_move: None,
                score,
                nodes: 0,
                depth,
            };
        }
        order_moves(position, &mut moves);

        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best_move = None;
        let mut best_score = -INFINITY;

        for &mv in &moves {
            if position.apply_move(mv).is_err() {
                continue;
            }
            let score = -self.alpha_beta(position, depth - 1, 1, -beta, -alpha);
            let reverted = position.revert_move(mv);
            debug_assert!(reverted.is_ok());

            // Strictly greater: ties keep the earlier move.
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
        }

        let outcome = SearchOutcome {
            best_move,
            score: best_score,
            nodes: self.nodes,
            depth,
        };
        tracing::debug!(
            depth,
            nodes = outcome.nodes,
            score = outcome.score,
            best = ?outcome.best_move,
            "search finished"
        );
        outcome
    }

    /// Alpha-beta search
    fn alpha_beta(&mut self, position: &mut Position, depth: u8, ply: i32, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;

        if depth == 0 {
            return evaluate(position);
        }

        let mut moves = MoveList::new();
        position.generate_legal_moves(&mut moves);
        if moves.is_empty() {
            return if position.in_check() {
                -MATE_SCORE + ply
            } else {
                0
            };
        }
        order_moves(position, &mut moves);

        for &mv in &moves {
            if position.apply_move(mv).is_err() {
                continue;
            }
            let score = -self.alpha_beta(position, depth - 1, ply + 1, -beta, -alpha);
            let reverted = position.revert_move(mv);
            debug_assert!(reverted.is_ok());

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

/// Searches a copy of `position` to `depth` plies.
pub fn search(position: &Position, depth: u8) -> SearchOutcome {
    let mut scratch = position.clone();
    Searcher::new().search(&mut scratch, depth)
}

/// Queues a search of a copy of `position` on `scheduler`. `callback` runs on
/// the worker with the outcome. Returns true if this replaced a search that
/// had not started yet.
pub fn submit_search<F>(scheduler: &JobScheduler, position: &Position, depth: u8, callback: F) -> bool
where
    F: FnOnce(SearchOutcome) + Send + 'static,
{
    let position = position.clone();
    scheduler.submit_with_notify(move || search(&position, depth), callback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_back_rank_mate() {
        let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let outcome = search(&position, 2);
        assert_eq!(outcome.best_move.map(|m| m.to_uci()), Some("a1a8".to_string()));
        assert_eq!(outcome.score, MATE_SCORE - 1);
        assert!(outcome.is_mate());
    }

    #[test]
    fn prefers_the_shortest_mate() {
        let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let outcome = search(&position, 4);
        assert_eq!(outcome.best_move.map(|m| m.to_uci()), Some("a1a8".to_string()));
        assert_eq!(outcome.score, MATE_SCORE - 1);
    }

    #[test]
    fn root_ties_keep_the_first_ordered_move() {
        // Each knight move off the back corner gains the same 50 points.
        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/N3K2N w - - 0 1").unwrap();
        let mut moves = MoveList::new();
        position.generate_legal_moves(&mut moves);
        order_moves(&position, &mut moves);

        let scores: Vec<(Move, i32)> = moves
            .iter()
            .map(|&mv| {
                let mut child = position.clone();
                child.apply_move(mv).unwrap();
                (mv, -evaluate(&child))
            })
            .collect();
        let best = scores.iter().map(|&(_, s)| s).max().unwrap();
        let tied: Vec<Move> = scores.iter().filter(|&&(_, s)| s == best).map(|&(m, _)| m).collect();
        assert!(tied.len() > 1);

        let outcome = search(&position, 1);
        assert_eq!(outcome.best_move, Some(tied[0]));
        assert_eq!(outcome.best_move.map(|m| m.to_uci()), Some("a1b3".to_string()));
        assert_eq!(outcome.score, best);
    }

    #[test]
    fn takes_hanging_queen() {
        let position = Position::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let outcome = search(&position, 2);
        assert_eq!(outcome.best_move.map(|m| m.to_uci()), Some("d1d5".to_string()));
        assert!(outcome.score > 0);
    }

    #[test]
    fn no_moves_means_no_best_move() {
        let mated = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let outcome = search(&mated, 3);
        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.score, -MATE_SCORE);

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let outcome = search(&stalemate, 3);
        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.score, 0);
    }

    #[test]
    fn search_leaves_position_untouched() {
        let position = Position::startpos();
        let outcome = search(&position, 3);
        assert!(outcome.best_move.is_some());
        assert!(outcome.nodes > 0);
        assert_eq!(outcome.depth, 3);
        assert_eq!(position, Position::startpos());
    }

    #[test]
    fn zero_depth_searches_one_ply() {
        let outcome = search(&Position::startpos(), 0);
        assert_eq!(outcome.depth, 1);
        assert!(outcome.best_move.is_some());
    }
}
