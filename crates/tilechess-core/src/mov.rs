//! Packed move and undo-record representation.

use crate::{CastleRights, Piece, PieceType, Square};
use std::fmt;

const FROM_MASK: u32 = 0x3F;
const TO_SHIFT: u32 = 6;
const EN_PASSANT: u32 = 1 << 12;
const DOUBLE_PUSH: u32 = 1 << 13;
const CASTLE: u32 = 1 << 14;
const CAPTURE: u32 = 1 << 15;
const PROMOTION_SHIFT: u32 = 16;
const PIECE_SHIFT: u32 = 20;
const NIBBLE: u32 = 0xF;

/// A move.
///
/// Encoded in 24 bits of a `u32`:
///
/// | bits  | field                         |
/// |-------|-------------------------------|
/// | 0-5   | from square                   |
/// | 6-11  | to square                     |
/// | 12    | en passant                    |
/// | 13    | pawn double push              |
/// | 14    | castle                        |
/// | 15    | capture                       |
/// | 16-19 | promotion [`PieceType`]       |
/// | 20-23 | moving [`PieceType`]          |
///
/// Two moves are the same move exactly when their packed values are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u32);

impl Move {
    /// A null move (placeholder, never legal).
    pub const NULL: Move = Move(0);

    /// Creates a plain move of `piece` from `from` to `to`.
    #[inline]
    pub const fn new(from: Square, to: Square, piece: PieceType) -> Self {
        Move(
            from.index() as u32
                | ((to.index() as u32) << TO_SHIFT)
                | ((piece as u32) << PIECE_SHIFT),
        )
    }

    /// Marks the move as a capture.
    #[inline]
    pub const fn with_capture(self) -> Self {
        Move(self.0 | CAPTURE)
    }

    /// Marks the move as an en-passant capture.
    #[inline]
    pub const fn with_en_passant(self) -> Self {
        Move(self.0 | EN_PASSANT | CAPTURE)
    }

    /// Marks the move as a pawn double push.
    #[inline]
    pub const fn with_double_push(self) -> Self {
        Move(self.0 | DOUBLE_PUSH)
    }

    /// Marks the move as a castle (king move; the rook follows).
    #[inline]
    pub const fn with_castle(self) -> Self {
        Move(self.0 | CASTLE)
    }

    /// Sets the promotion piece, replacing any previous choice.
    #[inline]
    pub const fn with_promotion(self, promotion: PieceType) -> Self {
        Move((self.0 & !(NIBBLE << PROMOTION_SHIFT)) | ((promotion as u32) << PROMOTION_SHIFT))
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        // SAFETY: masked to 6 bits, always a valid square index
        unsafe { Square::from_index_unchecked((self.0 & FROM_MASK) as u8) }
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        // SAFETY: masked to 6 bits, always a valid square index
        unsafe { Square::from_index_unchecked(((self.0 >> TO_SHIFT) & FROM_MASK) as u8) }
    }

    /// Returns the moving piece.
    #[inline]
    pub const fn piece(self) -> PieceType {
        match PieceType::from_index(((self.0 >> PIECE_SHIFT) & NIBBLE) as u8) {
            Some(pt) => pt,
            None => PieceType::Empty,
        }
    }

    /// Returns the promotion piece, `Empty` if none was chosen.
    #[inline]
    pub const fn promotion(self) -> PieceType {
        match PieceType::from_index(((self.0 >> PROMOTION_SHIFT) & NIBBLE) as u8) {
            Some(pt) => pt,
            None => PieceType::Empty,
        }
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.0 & CAPTURE != 0
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.0 & EN_PASSANT != 0
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        self.0 & DOUBLE_PUSH != 0
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.0 & CASTLE != 0
    }

    /// Returns true if a promotion piece has been chosen.
    #[inline]
    pub const fn is_promotion(self) -> bool {
        !self.promotion().is_empty()
    }

    /// Returns true for a pawn move that lands on its last rank.
    #[inline]
    pub const fn reaches_last_rank(self) -> bool {
        let piece = self.piece();
        match piece.color() {
            Some(color) => piece.is(Piece::Pawn) && self.to().rank() == color.promotion_rank(),
            None => false,
        }
    }

    /// Returns true for a last-rank pawn move whose promotion piece has not
    /// been chosen yet.
    #[inline]
    pub const fn is_promotion_pending(self) -> bool {
        self.reaches_last_rank() && !self.is_promotion()
    }

    /// Returns the packed value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion().piece() {
            Some(promo) => format!("{}{}{}", self.from(), self.to(), promo.to_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

const EP_MASK: u64 = 0x7F;
const RIGHTS_SHIFT: u64 = 7;
const FULLMOVE_SHIFT: u64 = 11;
const HALFMOVE_SHIFT: u64 = 27;
const CAPTURED_SHIFT: u64 = 43;

/// State a move destroys, captured before it is applied so it can be reverted.
///
/// Packed into a `u64`: en-passant square (7 bits, 64 means none), castle
/// rights (4), fullmove number (16), halfmove clock (16), captured piece (4).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRecord(u64);

impl MoveRecord {
    pub fn new(
        en_passant: Option<Square>,
        castle_rights: CastleRights,
        fullmove_number: u16,
        halfmove_clock: u16,
        captured: PieceType,
    ) -> Self {
        let ep = en_passant.map_or(Square::NONE_INDEX, Square::index) as u64;
        MoveRecord(
            ep | ((castle_rights.raw() as u64) << RIGHTS_SHIFT)
                | ((fullmove_number as u64) << FULLMOVE_SHIFT)
                | ((halfmove_clock as u64) << HALFMOVE_SHIFT)
                | ((captured as u64) << CAPTURED_SHIFT),
        )
    }

    #[inline]
    pub fn en_passant(self) -> Option<Square> {
        Square::from_index((self.0 & EP_MASK) as u8)
    }

    #[inline]
    pub fn castle_rights(self) -> CastleRights {
        CastleRights::new((self.0 >> RIGHTS_SHIFT) as u8)
    }

    #[inline]
    pub fn fullmove_number(self) -> u16 {
        (self.0 >> FULLMOVE_SHIFT) as u16
    }

    #[inline]
    pub fn halfmove_clock(self) -> u16 {
        (self.0 >> HALFMOVE_SHIFT) as u16
    }

    /// The piece taken by the move, `Empty` for a quiet move.
    #[inline]
    pub fn captured(self) -> PieceType {
        PieceType::from_index(((self.0 >> CAPTURED_SHIFT) & 0xF) as u8).unwrap_or_default()
    }
}

impl fmt::Debug for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveRecord")
            .field("en_passant", &self.en_passant())
            .field("castle_rights", &self.castle_rights())
            .field("fullmove_number", &self.fullmove_number())
            .field("halfmove_clock", &self.halfmove_clock())
            .field("captured", &self.captured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn move_fields() {
        let m = Move::new(sq("e2"), sq("e4"), PieceType::WhitePawn).with_double_push();
        assert_eq!(m.from(), sq("e2"));
        assert_eq!(m.to(), sq("e4"));
        assert_eq!(m.piece(), PieceType::WhitePawn);
        assert!(m.is_double_push());
        assert!(!m.is_capture());
        assert!(!m.is_castle());
        assert!(!m.is_promotion());
    }

    #[test]
    fn en_passant_implies_capture() {
        let m = Move::new(sq("e5"), sq("d6"), PieceType::WhitePawn).with_en_passant();
        assert!(m.is_en_passant());
        assert!(m.is_capture());
    }

    #[test]
    fn flags_distinguish_moves() {
        let quiet = Move::new(sq("e2"), sq("e4"), PieceType::WhitePawn);
        assert_ne!(quiet, quiet.with_double_push());
        assert_ne!(quiet, quiet.with_capture());
        assert_eq!(quiet, Move::new(sq("e2"), sq("e4"), PieceType::WhitePawn));
    }

    #[test]
    fn promotion_pending_until_chosen() {
        let m = Move::new(sq("a7"), sq("a8"), PieceType::WhitePawn);
        assert!(m.reaches_last_rank());
        assert!(m.is_promotion_pending());

        let chosen = m.with_promotion(PieceType::WhiteQueen);
        assert!(!chosen.is_promotion_pending());
        assert_eq!(chosen.promotion(), PieceType::WhiteQueen);
        assert_eq!(chosen.to_uci(), "a7a8q");

        let rechosen = chosen.with_promotion(PieceType::WhiteKnight);
        assert_eq!(rechosen.promotion(), PieceType::WhiteKnight);

        let black = Move::new(sq("h2"), sq("h1"), PieceType::BlackPawn);
        assert!(black.is_promotion_pending());
        let not_last = Move::new(sq("h3"), sq("h2"), PieceType::BlackPawn);
        assert!(!not_last.reaches_last_rank());
    }

    #[test]
    fn move_display() {
        let m = Move::new(sq("g1"), sq("f3"), PieceType::WhiteKnight);
        assert_eq!(format!("{:?}", m), "Move(g1f3)");
        assert_eq!(format!("{}", m), "g1f3");
    }

    #[test]
    fn record_without_en_passant() {
        let record = MoveRecord::new(None, CastleRights::ALL, 1, 0, PieceType::Empty);
        assert_eq!(record.en_passant(), None);
        assert_eq!(record.castle_rights(), CastleRights::ALL);
        assert_eq!(record.captured(), PieceType::Empty);
    }

    proptest! {
        #[test]
        fn record_keeps_every_field(
            ep in proptest::option::of(0u8..64),
            rights in 0u8..16,
            fullmove: u16,
            halfmove: u16,
            captured in 0u8..13,
        ) {
            let ep = ep.and_then(Square::from_index);
            let captured = PieceType::from_index(captured).unwrap();
            let record = MoveRecord::new(ep, CastleRights::new(rights), fullmove, halfmove, captured);
            prop_assert_eq!(record.en_passant(), ep);
            prop_assert_eq!(record.castle_rights().raw(), rights);
            prop_assert_eq!(record.fullmove_number(), fullmove);
            prop_assert_eq!(record.halfmove_clock(), halfmove);
            prop_assert_eq!(record.captured(), captured);
        }
    }
}
