//! Chess position representation.
//!
//! A position keeps three views of the board in lockstep:
//! - a 64-entry mailbox of [`PieceType`]
//! - one [`PieceLists`] entry per occupied square
//! - a [`Bitboard`] per colour and [`PieceClass`] (kings are only listed)
//!
//! Only the primitives in this module and the mutator touch the board, so
//! the three views cannot drift apart outside of them.

use std::fmt;

use tilechess_core::{
    CastleRights, CastleSide, Color, Fen, FenError, Move, MoveRecord, Piece, PieceClass, PieceType,
    Square,
};

use crate::piece_list::{PieceLists, PIECE_LIST_CAPACITY};
use crate::{Bitboard, Hasher};

/// One applied move together with the state needed to take it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub record: MoveRecord,
}

/// Complete chess position state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) tiles: [PieceType; 64],
    pub(crate) piece_lists: PieceLists,
    /// Indexed by [colour][piece class].
    pub(crate) bitboards: [[Bitboard; 3]; 2],
    pub(crate) turn: Color,
    pub(crate) castle_rights: CastleRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: u64,
    /// Hash before each applied move, parallel to `history`.
    pub(crate) hash_history: Vec<u64>,
    pub(crate) history: Vec<HistoryEntry>,
}

impl Position {
    /// Creates a position with no pieces. It is not playable until pieces
    /// (and both kings) are placed.
    pub fn empty() -> Self {
        let mut position = Position {
            tiles: [PieceType::Empty; 64],
            piece_lists: PieceLists::new(),
            bitboards: [[Bitboard::EMPTY; 3]; 2],
            turn: Color::White,
            castle_rights: CastleRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            hash_history: Vec::new(),
            history: Vec::new(),
        };
        position.hash = Hasher::hash(&position);
        position
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string.
    ///
    /// Besides syntax errors this rejects boards without exactly one king per
    /// side, pawns on the first or last rank and more pieces of one type than
    /// a piece list holds. Castle rights whose king or rook is away from its
    /// home square are dropped.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = Fen::parse(fen)?;
        let mut position = Position::empty();

        for sq in Square::all() {
            let piece = parsed.placement[sq.index() as usize];
            if piece.is_empty() {
                continue;
            }
            if piece.is(Piece::Pawn) && (sq.rank() == 0 || sq.rank() == 7) {
                return Err(FenError::PawnOnBackRank(sq));
            }
            if !position.put_piece(sq, piece) {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "more than {PIECE_LIST_CAPACITY} pieces of type {piece:?}"
                )));
            }
        }

        for color in Color::ALL {
            let count = position.piece_lists.count(PieceType::new(Piece::King, color));
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }

        position.turn = parsed.side_to_move;
        position.castle_rights = position.sanitize_castle_rights(parsed.castling);
        position.en_passant = parsed.en_passant;
        position.halfmove_clock = parsed.halfmove_clock;
        position.fullmove_number = parsed.fullmove_number;
        position.hash = Hasher::hash(&position);

        Ok(position)
    }

    fn sanitize_castle_rights(&self, mut rights: CastleRights) -> CastleRights {
        for color in Color::ALL {
            let rank = color.back_rank();
            let king_home = Square::from_coords(4, rank)
                .is_some_and(|sq| self.tile(sq) == PieceType::new(Piece::King, color));
            for side in CastleSide::ALL {
                let rook_home = Square::from_coords(side.rook_file(), rank)
                    .is_some_and(|sq| self.tile(sq) == PieceType::new(Piece::Rook, color));
                if !(king_home && rook_home) {
                    rights.remove(color, side);
                }
            }
        }
        rights
    }

    /// Converts the position to a six-field FEN string.
    pub fn to_fen(&self) -> String {
        Fen {
            placement: self.tiles,
            side_to_move: self.turn,
            castling: self.castle_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_string()
    }

    #[inline]
    pub fn tile(&self, sq: Square) -> PieceType {
        self.tiles[sq.index() as usize]
    }

    #[inline]
    pub fn is_piece(&self, sq: Square) -> bool {
        !self.tile(sq).is_empty()
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn castle_rights(&self) -> CastleRights {
        self.castle_rights
    }

    /// En passant target square (if any).
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Squares holding `piece`, in no particular order.
    #[inline]
    pub fn piece_list(&self, piece: PieceType) -> &[Square] {
        self.piece_lists.get(piece)
    }

    #[inline]
    pub fn bitboard(&self, color: Color, class: PieceClass) -> Bitboard {
        self.bitboards[color.index()][class.index()]
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.piece_list(PieceType::new(Piece::King, color)).first().copied()
    }

    /// Applied moves, oldest first.
    #[inline]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Hashes of the positions before each applied move, oldest first.
    #[inline]
    pub fn hash_history(&self) -> &[u64] {
        &self.hash_history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|entry| entry.mv)
    }

    /// Cross-checks every redundant view of the board.
    pub fn is_valid(&self) -> bool {
        match self.check_invariants() {
            Ok(()) => true,
            Err(reason) => {
                tracing::error!(fen = %self.to_fen(), reason, "position invariant violated");
                false
            }
        }
    }

    fn check_invariants(&self) -> Result<(), &'static str> {
        for color in Color::ALL {
            if self.piece_lists.count(PieceType::new(Piece::King, color)) != 1 {
                return Err("king count");
            }
        }

        let mut bitboards = [[Bitboard::EMPTY; 3]; 2];
        let mut occupied = 0;
        for sq in Square::all() {
            let piece = self.tile(sq);
            if piece.is_empty() {
                continue;
            }
            occupied += 1;
            if !self.piece_lists.contains(piece, sq) {
                return Err("tile missing from piece list");
            }
            if let Some((color, class)) = Self::bitboard_slot(piece) {
                bitboards[color.index()][class.index()].set(sq);
            }
        }
        if occupied != self.piece_lists.total() {
            return Err("piece list holds stale squares");
        }
        if bitboards != self.bitboards {
            return Err("bitboards disagree with tiles");
        }
        if self.hash_history.len() != self.history.len() {
            return Err("hash history length");
        }
        if self.hash != Hasher::hash(self) {
            return Err("stale hash");
        }
        Ok(())
    }

    fn bitboard_slot(piece: PieceType) -> Option<(Color, PieceClass)> {
        Some((piece.color()?, piece.piece()?.class()?))
    }

    /// Places `piece` on the empty square `sq`. Returns false if its piece
    /// list is full.
    pub(crate) fn put_piece(&mut self, sq: Square, piece: PieceType) -> bool {
        debug_assert!(!self.is_piece(sq), "put_piece on occupied {sq}");
        if !self.piece_lists.add(piece, sq) {
            return false;
        }
        self.tiles[sq.index() as usize] = piece;
        if let Some((color, class)) = Self::bitboard_slot(piece) {
            self.bitboards[color.index()][class.index()].set(sq);
        }
        true
    }

    /// Clears `sq` and returns what stood there.
    pub(crate) fn remove_piece(&mut self, sq: Square) -> PieceType {
        let piece = self.tile(sq);
        if piece.is_empty() {
            return piece;
        }
        self.piece_lists.remove(piece, sq);
        self.tiles[sq.index() as usize] = PieceType::Empty;
        if let Some((color, class)) = Self::bitboard_slot(piece) {
            self.bitboards[color.index()][class.index()].clear(sq);
        }
        piece
    }

    /// Moves the piece on `from` to the empty square `to`.
    pub(crate) fn shift_piece(&mut self, from: Square, to: Square) {
        let piece = self.tile(from);
        debug_assert!(!piece.is_empty(), "shift_piece from empty {from}");
        debug_assert!(!self.is_piece(to), "shift_piece onto occupied {to}");
        self.piece_lists.relocate(piece, from, to);
        self.tiles[from.index() as usize] = PieceType::Empty;
        self.tiles[to.index() as usize] = piece;
        if let Some((color, class)) = Self::bitboard_slot(piece) {
            let bb = &mut self.bitboards[color.index()][class.index()];
            bb.clear(from);
            bb.set(to);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = Square::from_coords(file, rank)
                    .and_then(|sq| self.tile(sq).to_fen_char())
                    .unwrap_or('.');
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
