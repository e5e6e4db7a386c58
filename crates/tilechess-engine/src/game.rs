//! Interactive game state.
//!
//! [`Game`] wraps a [`Position`] with what a user interface needs: legal
//! destinations per square, a two-step promotion flow and cached check
//! flags. It only accepts legal moves.

use std::collections::BTreeMap;

use thiserror::Error;
use tilechess_core::{Color, FenError, Move, Piece, PieceType, Square};

use crate::search;
use crate::{MoveError, Position};

/// Error type for game operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(Move),
    /// A pawn reached its last rank and waits for [`Game::promote`].
    #[error("promotion pending for {0}")]
    PromotionPending(Move),
    #[error("no promotion is pending")]
    NoPendingPromotion,
    /// Pawns, kings and empty tiles are not promotion choices.
    #[error("cannot promote to {0:?}")]
    InvalidPromotion(PieceType),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Fen(#[from] FenError),
}

/// A game in progress.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    /// Last-rank pawn move waiting for its promotion piece.
    pending_promotion: Option<Move>,
    in_check: bool,
    in_checkmate: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    pub fn from_position(position: Position) -> Self {
        let mut game = Game {
            position,
            pending_promotion: None,
            in_check: false,
            in_checkmate: false,
        };
        game.refresh_flags();
        game
    }

    fn refresh_flags(&mut self) {
        self.in_check = self.position.in_check();
        self.in_checkmate = self.in_check && self.position.legal_moves().is_empty();
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn tile(&self, sq: Square) -> PieceType {
        self.position.tile(sq)
    }

    pub fn is_piece(&self, sq: Square) -> bool {
        self.position.is_piece(sq)
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn hash(&self) -> u64 {
        self.position.hash()
    }

    /// Returns true if the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    /// Returns true if the side to move is checkmated.
    pub fn in_checkmate(&self) -> bool {
        self.in_checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check && self.position.legal_moves().is_empty()
    }

    pub fn captured_pieces(&self) -> Vec<PieceType> {
        self.position.captured_pieces()
    }

    pub fn pending_promotion(&self) -> Option<Move> {
        self.pending_promotion
    }

    /// Legal moves of the piece on `sq`, keyed by destination.
    ///
    /// The four promotions to one square are collapsed into a single
    /// promotion-pending move, to be completed with [`promote`](Self::promote).
    pub fn legal_destinations(&self, sq: Square) -> BTreeMap<Square, Move> {
        let mut destinations = BTreeMap::new();
        for &mv in &self.position.legal_moves_from(sq) {
            let mv = if mv.is_promotion() {
                mv.with_promotion(PieceType::Empty)
            } else {
                mv
            };
            destinations.entry(mv.to()).or_insert(mv);
        }
        destinations
    }

    /// Plays `mv` if it is legal.
    ///
    /// A promotion-pending move is parked and reported as
    /// [`GameError::PromotionPending`]; the board changes once
    /// [`promote`](Self::promote) picks the piece.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), GameError> {
        if let Some(pending) = self.pending_promotion {
            return Err(GameError::PromotionPending(pending));
        }

        if mv.is_promotion_pending() {
            let reachable = self
                .position
                .legal_moves_from(mv.from())
                .iter()
                .any(|m| m.with_promotion(PieceType::Empty) == mv);
            if !reachable {
                tracing::debug!(%mv, fen = %self.fen(), "rejected illegal move");
                return Err(GameError::IllegalMove(mv));
            }
            self.pending_promotion = Some(mv);
            return Err(GameError::PromotionPending(mv));
        }

        if !self.position.is_legal(mv) {
            tracing::debug!(%mv, fen = %self.fen(), "rejected illegal move");
            return Err(GameError::IllegalMove(mv));
        }
        self.position.apply_move(mv)?;
        self.refresh_flags();
        Ok(())
    }

    /// Completes the pending promotion with `piece`. Its colour is taken
    /// from the side to move.
    pub fn promote(&mut self, piece: PieceType) -> Result<(), GameError> {
        let pending = self.pending_promotion.ok_or(GameError::NoPendingPromotion)?;
        let kind = piece
            .piece()
            .filter(|p| !matches!(p, Piece::Pawn | Piece::King))
            .ok_or(GameError::InvalidPromotion(piece))?;
        let mv = pending.with_promotion(PieceType::new(kind, self.position.turn()));
        self.position.apply_move(mv)?;
        self.pending_promotion = None;
        self.refresh_flags();
        Ok(())
    }

    /// Drops a pending promotion without playing it.
    pub fn cancel_promotion(&mut self) -> Option<Move> {
        self.pending_promotion.take()
    }

    /// Takes back the last move and returns it.
    ///
    /// While a promotion is pending only that choice is withdrawn: the
    /// parked move is returned and the history is left alone.
    pub fn undo(&mut self) -> Result<Move, GameError> {
        if let Some(pending) = self.pending_promotion.take() {
            return Ok(pending);
        }
        let mv = self.position.undo()?;
        self.refresh_flags();
        Ok(mv)
    }

    /// Best move for the side to move at `depth`, searched on a copy.
    pub fn search(&self, depth: u8) -> Option<Move> {
        search::search(&self.position, depth).best_move
    }
}
