//! Applying and taking back moves.
//!
//! Every apply pushes a [`MoveRecord`] holding the state the move destroys,
//! and every revert consumes it, so a position returns to exactly the state
//! it had before the move. Legality is decided by applying a pseudo-legal
//! move, probing the mover's king and reverting.

use thiserror::Error;
use tilechess_core::{CastleSide, Color, Move, MoveRecord, Piece, PieceType, Square};

use crate::movegen::{generate_moves, generate_moves_from, is_king_attacked, MoveList};
use crate::piece_list::PIECE_LIST_CAPACITY;
use crate::position::HistoryEntry;
use crate::{Hasher, Position};

/// Errors from applying or reverting a move.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    EmptySource(Square),

    #[error("piece on {square} does not belong to {turn}")]
    WrongColor { square: Square, turn: Color },

    #[error("move {0} does not match the piece on its source square")]
    PieceMismatch(Move),

    #[error("cannot capture own piece on {0}")]
    OwnPieceCapture(Square),

    #[error("cannot capture the king on {0}")]
    KingCapture(Square),

    #[error("no en passant capture available for {0}")]
    InvalidEnPassant(Move),

    #[error("castle {0} needs its rook at home and a free landing square")]
    MissingCastleRook(Move),

    #[error("promotion piece not chosen for {0}")]
    PromotionNotChosen(Move),

    #[error("invalid promotion for {0}")]
    InvalidPromotion(Move),

    #[error("{0} is not the most recently applied move")]
    NotLastMove(Move),

    #[error("no move to undo")]
    NothingToUndo,
}

/// Squares a castle moves its rook between, for the king landing on `to`.
fn castle_rook_squares(to: Square) -> Option<(Square, Square)> {
    let side = CastleSide::from_king_target_file(to.file())?;
    let from = Square::from_coords(side.rook_file(), to.rank())?;
    let target = Square::from_coords(side.rook_target_file(), to.rank())?;
    Some((from, target))
}

/// Square of the pawn taken by an en passant capture landing on `to`.
fn en_passant_victim(to: Square, mover: Color) -> Option<Square> {
    to.offset(0, -mover.pawn_direction())
}

impl Position {
    /// Applies `mv` for the side to move.
    ///
    /// All preconditions are checked before anything changes, so on `Err`
    /// the position is untouched. The move need not be legal: a move that
    /// leaves the mover's king attacked is applied like any other.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        let captured_on = self.validate(mv)?;
        let from = mv.from();
        let to = mv.to();
        let mover = self.turn;

        let captured = captured_on.map_or(PieceType::Empty, |sq| self.tile(sq));
        let record = MoveRecord::new(
            self.en_passant,
            self.castle_rights,
            self.fullmove_number,
            self.halfmove_clock,
            captured,
        );
        self.hash_history.push(self.hash);
        self.history.push(HistoryEntry { mv, record });

        if let Some(sq) = captured_on {
            self.remove_piece(sq);
        }
        if mv.is_promotion() {
            self.remove_piece(from);
            let placed = self.put_piece(to, mv.promotion());
            debug_assert!(placed, "promotion piece list overflow");
        } else {
            self.shift_piece(from, to);
        }
        if mv.is_castle() {
            if let Some((rook_from, rook_to)) = castle_rook_squares(to) {
                self.shift_piece(rook_from, rook_to);
            }
        }

        self.castle_rights = self.castle_rights.without_square(from).without_square(to);
        self.en_passant = if mv.is_double_push() {
            from.offset(0, mover.pawn_direction())
        } else {
            None
        };
        if mv.piece().is(Piece::Pawn) || !captured.is_empty() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.turn = mover.opposite();
        self.hash = Hasher::hash(self);

        debug_assert!(self.is_valid(), "invalid position after applying {mv}");
        Ok(())
    }

    /// Checks that `mv` can be applied and returns the square of the piece
    /// it captures, if any.
    fn validate(&self, mv: Move) -> Result<Option<Square>, MoveError> {
        let from = mv.from();
        let to = mv.to();
        let moving = self.tile(from);
        if moving.is_empty() {
            return Err(MoveError::EmptySource(from));
        }
        if !moving.is_color(self.turn) {
            return Err(MoveError::WrongColor {
                square: from,
                turn: self.turn,
            });
        }
        if moving != mv.piece() {
            return Err(MoveError::PieceMismatch(mv));
        }

        let target = self.tile(to);
        if target.is_color(self.turn) {
            return Err(MoveError::OwnPieceCapture(to));
        }
        if target.is(Piece::King) {
            return Err(MoveError::KingCapture(to));
        }

        if mv.is_promotion_pending() {
            return Err(MoveError::PromotionNotChosen(mv));
        }
        if mv.is_promotion() {
            let promotion = mv.promotion();
            let allowed = mv.reaches_last_rank()
                && promotion.is_color(self.turn)
                && !promotion.is(Piece::Pawn)
                && !promotion.is(Piece::King)
                && self.piece_lists.count(promotion) < PIECE_LIST_CAPACITY;
            if !allowed {
                return Err(MoveError::InvalidPromotion(mv));
            }
        }

        if mv.is_castle() {
            let home = Square::from_coords(4, self.turn.back_rank());
            let rook = PieceType::new(Piece::Rook, self.turn);
            let ready = moving.is(Piece::King)
                && home == Some(from)
                && target.is_empty()
                && castle_rook_squares(to).is_some_and(|(rook_from, rook_to)| {
                    self.tile(rook_from) == rook && !self.is_piece(rook_to)
                });
            if !ready {
                return Err(MoveError::MissingCastleRook(mv));
            }
        }

        if mv.is_en_passant() {
            let victim = en_passant_victim(to, self.turn)
                .filter(|sq| self.tile(*sq) == PieceType::new(Piece::Pawn, self.turn.opposite()));
            return match victim {
                Some(sq) if self.en_passant == Some(to) && moving.is(Piece::Pawn) => Ok(Some(sq)),
                _ => Err(MoveError::InvalidEnPassant(mv)),
            };
        }

        Ok((!target.is_empty()).then_some(to))
    }

    /// Takes back `mv`, which must be the most recently applied move.
    pub fn revert_move(&mut self, mv: Move) -> Result<(), MoveError> {
        match self.history.last() {
            None => return Err(MoveError::NothingToUndo),
            Some(entry) if entry.mv != mv => return Err(MoveError::NotLastMove(mv)),
            Some(_) => {}
        }
        let (Some(HistoryEntry { record, .. }), Some(hash)) =
            (self.history.pop(), self.hash_history.pop())
        else {
            return Err(MoveError::NothingToUndo);
        };

        let from = mv.from();
        let to = mv.to();
        let mover = self.turn.opposite();

        if mv.is_castle() {
            if let Some((rook_from, rook_to)) = castle_rook_squares(to) {
                self.shift_piece(rook_to, rook_from);
            }
        }
        if mv.is_promotion() {
            self.remove_piece(to);
            self.put_piece(from, mv.piece());
        } else {
            self.shift_piece(to, from);
        }
        let captured = record.captured();
        if !captured.is_empty() {
            let square = if mv.is_en_passant() {
                en_passant_victim(to, mover)
            } else {
                Some(to)
            };
            if let Some(sq) = square {
                self.put_piece(sq, captured);
            }
        }

        self.turn = mover;
        self.castle_rights = record.castle_rights();
        self.en_passant = record.en_passant();
        self.halfmove_clock = record.halfmove_clock();
        self.fullmove_number = record.fullmove_number();
        self.hash = hash;

        debug_assert!(self.is_valid(), "invalid position after reverting {mv}");
        Ok(())
    }

    /// Takes back the most recently applied move and returns it.
    pub fn undo(&mut self) -> Result<Move, MoveError> {
        let mv = self.last_move().ok_or(MoveError::NothingToUndo)?;
        self.revert_move(mv)?;
        Ok(mv)
    }

    /// Applies a pseudo-legal move, reports whether the mover's king stays
    /// safe, and takes the move back.
    pub(crate) fn keeps_king_safe(&mut self, mv: Move) -> bool {
        let mover = self.turn;
        if self.apply_move(mv).is_err() {
            return false;
        }
        let safe = !is_king_attacked(self, mover);
        let reverted = self.revert_move(mv);
        debug_assert!(reverted.is_ok());
        safe
    }

    /// Replaces `moves` with the legal moves of the side to move, in
    /// generation order. Works in place on `self`.
    pub fn generate_legal_moves(&mut self, moves: &mut MoveList) {
        moves.clear();
        generate_moves(self, moves);
        moves.retain(|&mv| self.keeps_king_safe(mv));
    }

    /// Returns true if `mv` is a legal move for the side to move.
    pub fn is_legal(&self, mv: Move) -> bool {
        if !mv.piece().is_color(self.turn) {
            return false;
        }
        let mut pseudo = MoveList::new();
        generate_moves_from(self, mv.from(), &mut pseudo);
        pseudo.contains(mv) && self.clone().keeps_king_safe(mv)
    }

    /// Returns every legal move of the side to move.
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        self.clone().generate_legal_moves(&mut moves);
        moves
    }

    /// Returns the legal moves of the piece on `from`. Empty if the square is
    /// empty or holds a piece of the side not to move.
    pub fn legal_moves_from(&self, from: Square) -> MoveList {
        let mut moves = MoveList::new();
        if !self.tile(from).is_color(self.turn) {
            return moves;
        }
        generate_moves_from(self, from, &mut moves);
        let mut scratch = self.clone();
        moves.retain(|&mv| scratch.keeps_king_safe(mv));
        moves
    }

    /// Returns true if the side to move is in check.
    pub fn in_check(&self) -> bool {
        is_king_attacked(self, self.turn)
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check() && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && self.legal_moves().is_empty()
    }

    /// Pieces captured so far, in capture order.
    pub fn captured_pieces(&self) -> Vec<PieceType> {
        self.history
            .iter()
            .map(|entry| entry.record.captured())
            .filter(|piece| !piece.is_empty())
            .collect()
    }
}
