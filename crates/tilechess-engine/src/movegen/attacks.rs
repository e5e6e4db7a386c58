//! Offset tables and square-attack detection.
//!
//! Attacks are found by walking the board from the target square outwards,
//! so nothing here is precomputed beyond the direction vectors. The class
//! bitboards of the attacking side let a probe skip piece groups it has
//! none of.

use crate::Position;
use tilechess_core::{Color, Piece, PieceClass, PieceType, Square};

/// (file, rank) steps of a knight.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// (file, rank) steps of a king.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Returns true if any piece of `by` attacks `sq`.
///
/// Pawns, knights and the king are probed with their offsets reversed, then
/// each ray is walked until it meets a piece. Returns on the first hit.
pub fn is_attacked(position: &Position, sq: Square, by: Color) -> bool {
    let has_pawns = !position.bitboard(by, PieceClass::Pawn).is_empty();
    let has_minors = !position.bitboard(by, PieceClass::Minor).is_empty();
    let has_majors = !position.bitboard(by, PieceClass::Major).is_empty();

    if has_pawns {
        let pawn = PieceType::new(Piece::Pawn, by);
        // An attacking pawn sits one rank behind the target from its own view.
        let behind = -by.pawn_direction();
        for file_delta in [-1, 1] {
            if sq
                .offset(file_delta, behind)
                .is_some_and(|from| position.tile(from) == pawn)
            {
                return true;
            }
        }
    }

    if has_minors && hits_any(position, sq, &KNIGHT_OFFSETS, PieceType::new(Piece::Knight, by)) {
        return true;
    }
    if hits_any(position, sq, &KING_OFFSETS, PieceType::new(Piece::King, by)) {
        return true;
    }

    let queen = PieceType::new(Piece::Queen, by);
    let rook = PieceType::new(Piece::Rook, by);
    let bishop = PieceType::new(Piece::Bishop, by);
    // Queens sit in the major bitboard, so diagonals need either class.
    (has_majors && ray_hits(position, sq, &ROOK_DIRECTIONS, rook, queen))
        || ((has_majors || has_minors) && ray_hits(position, sq, &BISHOP_DIRECTIONS, bishop, queen))
}

/// Returns true if the king of `color` is attacked. A side without a king is
/// never in check.
pub fn is_king_attacked(position: &Position, color: Color) -> bool {
    position
        .king_square(color)
        .is_some_and(|king| is_attacked(position, king, color.opposite()))
}

fn hits_any(position: &Position, sq: Square, offsets: &[(i8, i8)], attacker: PieceType) -> bool {
    offsets.iter().any(|&(df, dr)| {
        sq.offset(df, dr)
            .is_some_and(|from| position.tile(from) == attacker)
    })
}

fn ray_hits(
    position: &Position,
    sq: Square,
    directions: &[(i8, i8)],
    slider: PieceType,
    queen: PieceType,
) -> bool {
    for &(df, dr) in directions {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            let piece = position.tile(next);
            if !piece.is_empty() {
                if piece == slider || piece == queen {
                    return true;
                }
                break;
            }
            current = next;
        }
    }
    false
}
