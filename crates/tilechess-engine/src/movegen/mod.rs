//! Pseudo-legal move generation.
//!
//! Generated moves obey piece movement, occupancy and castling conditions
//! but may leave the mover's own king in check. The mutator filters those
//! out by applying each move and probing the king.
//!
//! Captures of a king are never generated.

mod attacks;
pub mod perft;

use crate::Position;
use tilechess_core::{CastleSide, Color, Move, Piece, PieceType, Square};

pub use attacks::{
    is_attacked, is_king_attacked, BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS,
    ROOK_DIRECTIONS,
};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves in any chess position.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true, keeping
    /// their order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Appends every pseudo-legal move of the side to move.
pub fn generate_moves(position: &Position, moves: &mut MoveList) {
    let us = position.turn();
    for piece in Piece::ALL {
        let piece_type = PieceType::new(piece, us);
        for &from in position.piece_list(piece_type) {
            generate_piece_moves(position, from, piece_type, moves);
        }
    }
}

/// Appends the pseudo-legal moves of the piece on `from`, whichever side it
/// belongs to. An empty square yields nothing.
pub fn generate_moves_from(position: &Position, from: Square, moves: &mut MoveList) {
    let piece_type = position.tile(from);
    if !piece_type.is_empty() {
        generate_piece_moves(position, from, piece_type, moves);
    }
}

fn generate_piece_moves(position: &Position, from: Square, piece_type: PieceType, moves: &mut MoveList) {
    let (Some(piece), Some(color)) = (piece_type.piece(), piece_type.color()) else {
        return;
    };
    match piece {
        Piece::Pawn => generate_pawn_moves(position, from, color, moves),
        Piece::Knight => generate_step_moves(position, from, piece_type, color, &KNIGHT_OFFSETS, moves),
        Piece::Bishop => generate_slider_moves(position, from, piece_type, color, &BISHOP_DIRECTIONS, moves),
        Piece::Rook => generate_slider_moves(position, from, piece_type, color, &ROOK_DIRECTIONS, moves),
        Piece::Queen => {
            generate_slider_moves(position, from, piece_type, color, &ROOK_DIRECTIONS, moves);
            generate_slider_moves(position, from, piece_type, color, &BISHOP_DIRECTIONS, moves);
        }
        Piece::King => {
            generate_step_moves(position, from, piece_type, color, &KING_OFFSETS, moves);
            generate_castling_moves(position, from, piece_type, color, moves);
        }
    }
}

/// Returns true if `target` may be taken by a piece of `color`.
#[inline]
fn is_capturable(target: PieceType, color: Color) -> bool {
    target.is_color(color.opposite()) && !target.is(Piece::King)
}

fn generate_pawn_moves(position: &Position, from: Square, color: Color, moves: &mut MoveList) {
    let pawn = PieceType::new(Piece::Pawn, color);
    let dir = color.pawn_direction();

    if let Some(one) = from.offset(0, dir) {
        if !position.is_piece(one) {
            push_pawn_move(Move::new(from, one, pawn), color, moves);
            if from.rank() == color.pawn_rank() {
                if let Some(two) = one.offset(0, dir).filter(|sq| !position.is_piece(*sq)) {
                    moves.push(Move::new(from, two, pawn).with_double_push());
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        let Some(to) = from.offset(file_delta, dir) else {
            continue;
        };
        let target = position.tile(to);
        if is_capturable(target, color) {
            push_pawn_move(Move::new(from, to, pawn).with_capture(), color, moves);
        } else if color == position.turn() && position.en_passant() == Some(to) {
            moves.push(Move::new(from, to, pawn).with_en_passant());
        }
    }
}

/// Pushes a pawn move, expanded into the four promotions on the last rank.
fn push_pawn_move(mv: Move, color: Color, moves: &mut MoveList) {
    if mv.to().rank() == color.promotion_rank() {
        for piece in Piece::PROMOTIONS {
            moves.push(mv.with_promotion(PieceType::new(piece, color)));
        }
    } else {
        moves.push(mv);
    }
}

fn generate_step_moves(
    position: &Position,
    from: Square,
    piece_type: PieceType,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        let target = position.tile(to);
        if target.is_empty() {
            moves.push(Move::new(from, to, piece_type));
        } else if is_capturable(target, color) {
            moves.push(Move::new(from, to, piece_type).with_capture());
        }
    }
}

fn generate_slider_moves(
    position: &Position,
    from: Square,
    piece_type: PieceType,
    color: Color,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            let target = position.tile(to);
            if target.is_empty() {
                moves.push(Move::new(from, to, piece_type));
                current = to;
                continue;
            }
            if is_capturable(target, color) {
                moves.push(Move::new(from, to, piece_type).with_capture());
            }
            break;
        }
    }
}

fn generate_castling_moves(
    position: &Position,
    from: Square,
    king: PieceType,
    color: Color,
    moves: &mut MoveList,
) {
    let rank = color.back_rank();
    if Square::from_coords(4, rank) != Some(from) {
        return;
    }
    let them = color.opposite();
    let rights = position.castle_rights();
    if !CastleSide::ALL.iter().any(|&side| rights.has(color, side)) {
        return;
    }
    if is_attacked(position, from, them) {
        return;
    }

    for side in CastleSide::ALL {
        if !rights.has(color, side) {
            continue;
        }
        let (Some(rook_sq), Some(transit), Some(to)) = (
            Square::from_coords(side.rook_file(), rank),
            Square::from_coords(side.rook_target_file(), rank),
            Square::from_coords(side.king_target_file(), rank),
        ) else {
            continue;
        };
        if position.tile(rook_sq) != PieceType::new(Piece::Rook, color) {
            continue;
        }
        if position.is_piece(transit) || position.is_piece(to) {
            continue;
        }
        // The queenside rook also passes the b-file square.
        if side == CastleSide::Queen
            && Square::from_coords(1, rank).is_some_and(|sq| position.is_piece(sq))
        {
            continue;
        }
        if is_attacked(position, transit, them) || is_attacked(position, to, them) {
            continue;
        }
        moves.push(Move::new(from, to, king).with_castle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn moves_of(fen: &str) -> MoveList {
        let position = Position::from_fen(fen).unwrap();
        let mut moves = MoveList::new();
        generate_moves(&position, &mut moves);
        moves
    }

    fn moves_from(fen: &str, from: &str) -> MoveList {
        let position = Position::from_fen(fen).unwrap();
        let mut moves = MoveList::new();
        generate_moves_from(&position, sq(from), &mut moves);
        moves
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let moves = moves_of(tilechess_core::Fen::STARTPOS);
        assert_eq!(moves.len(), 20);
        assert_eq!(moves.iter().filter(|m| m.is_double_push()).count(), 8);
    }

    #[test]
    fn blocked_pawn_has_no_push() {
        let moves = moves_from("4k3/8/8/8/8/4p3/4P3/4K3 w - - 0 1", "e2");
        assert!(moves.is_empty());
    }

    #[test]
    fn double_push_needs_both_squares_empty() {
        let moves = moves_from("4k3/8/8/8/4p3/8/4P3/4K3 w - - 0 1", "e2");
        assert_eq!(moves.len(), 1);
        assert!(!moves[0].is_double_push());
    }

    #[test]
    fn promotions_are_expanded() {
        let moves = moves_from("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7");
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.is_promotion()));
        assert_eq!(moves.iter().filter(|m| m.is_capture()).count(), 4);
        assert!(moves
            .iter()
            .any(|m| m.promotion() == PieceType::WhiteKnight && m.to() == sq("b8")));
    }

    #[test]
    fn en_passant_only_on_target() {
        let moves = moves_from(
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "e5",
        );
        let ep: Vec<_> = moves.iter().filter(|m| m.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to(), sq("f6"));
        assert!(ep[0].is_capture());
    }

    #[test]
    fn slider_stops_at_pieces() {
        let moves = moves_from("4k3/8/8/8/1p6/8/8/R3K3 w - - 0 1", "a1");
        // a2..a8 (7) + b1, c1, d1 (3)
        assert_eq!(moves.len(), 10);
        let moves = moves_from("4k3/8/8/8/1p6/8/8/B3K3 w - - 0 1", "a1");
        // The whole long diagonal; b4 is off it.
        assert_eq!(moves.len(), 7);
        let moves = moves_from("4k3/8/8/8/8/2p5/8/B3K3 w - - 0 1", "a1");
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().any(|m| m.is_capture() && m.to() == sq("c3")));
    }

    #[test]
    fn kings_are_never_captured() {
        let moves = moves_from("4k3/8/8/8/8/8/8/4RK2 w - - 0 1", "e1");
        assert!(moves.iter().all(|m| m.to() != sq("e8")));
    }

    #[test]
    fn castling_both_sides() {
        let moves = moves_from("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "e1");
        let castles: Vec<_> = moves.iter().filter(|m| m.is_castle()).map(|m| m.to()).collect();
        assert_eq!(castles, vec![sq("g1"), sq("c1")]);
    }

    #[test]
    fn castling_blocked_or_attacked() {
        // Knight on b1 blocks the queenside.
        let moves = moves_from("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1", "e1");
        assert_eq!(moves.iter().filter(|m| m.is_castle()).count(), 1);
        // Rook on f8 covers f1.
        let moves = moves_from("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1", "e1");
        let castles: Vec<_> = moves.iter().filter(|m| m.is_castle()).map(|m| m.to()).collect();
        assert_eq!(castles, vec![sq("c1")]);
        // In check: no castling at all.
        let moves = moves_from("r3k2r/8/8/8/8/8/4r3/R3K2R w KQ - 0 1", "e1");
        assert_eq!(moves.iter().filter(|m| m.is_castle()).count(), 0);
    }

    #[test]
    fn generates_for_either_colour() {
        let moves = moves_from(tilechess_core::Fen::STARTPOS, "g8");
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.piece() == PieceType::BlackKnight));
        assert!(moves_from(tilechess_core::Fen::STARTPOS, "e4").is_empty());
    }
}
