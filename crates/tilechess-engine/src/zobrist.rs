//! Position fingerprinting.
//!
//! Every feature of a position has a fixed pseudo-random key:
//! - one per piece type on each square (13 x 64, the `Empty` row is zero)
//! - one per en passant file (8)
//! - one per castle-rights combination (16)
//! - one per side to move (2)
//!
//! The hash is the XOR of the keys of all active features, so it depends only
//! on the resulting position and never on the move order that produced it.

use crate::Position;
use tilechess_core::{CastleRights, Color, PieceType, Square};

/// Zobrist hash keys.
///
/// Generated at compile time from a fixed seed, so hashes are stable across
/// runs and builds.
pub struct ZobristKeys {
    /// Keys for pieces: [piece type][square].
    pub pieces: [[u64; 64]; PieceType::COUNT],
    /// Keys for en passant file.
    pub en_passant: [u64; 8],
    /// Keys for each castle-rights mask.
    pub castling: [u64; 16],
    /// Keys for the side to move.
    pub side: [u64; 2],
}

impl ZobristKeys {
    /// Initializes the keys with a xorshift64 generator.
    pub const fn new() -> Self {
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut pieces = [[0u64; 64]; PieceType::COUNT];
        let mut en_passant = [0u64; 8];
        let mut castling = [0u64; 16];
        let mut side = [0u64; 2];

        // Row 0 is `Empty` and stays zero.
        let mut piece = 1;
        while piece < PieceType::COUNT {
            let mut square = 0;
            while square < 64 {
                state = next_random(state);
                pieces[piece][square] = state;
                square += 1;
            }
            piece += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 16 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 2 {
            state = next_random(state);
            side[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            en_passant,
            castling,
            side,
        }
    }

    #[inline]
    pub const fn piece_key(&self, piece: PieceType, square: Square) -> u64 {
        self.pieces[piece.index()][square.index() as usize]
    }

    #[inline]
    pub const fn en_passant_key(&self, square: Square) -> u64 {
        self.en_passant[square.file() as usize]
    }

    #[inline]
    pub const fn castling_key(&self, rights: CastleRights) -> u64 {
        self.castling[rights.raw() as usize]
    }

    #[inline]
    pub const fn side_key(&self, color: Color) -> u64 {
        self.side[color.index()]
    }
}

/// Global Zobrist keys (initialized at compile time).
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

/// Computes position fingerprints from [`ZOBRIST`].
pub struct Hasher;

impl Hasher {
    /// Hashes the full position from scratch.
    pub fn hash(position: &Position) -> u64 {
        let mut hash = ZOBRIST.side_key(position.turn()) ^ ZOBRIST.castling_key(position.castle_rights());
        if let Some(ep) = position.en_passant() {
            hash ^= ZOBRIST.en_passant_key(ep);
        }
        for piece in PieceType::PIECES {
            for &sq in position.piece_list(piece) {
                hash ^= ZOBRIST.piece_key(piece, sq);
            }
        }
        hash
    }
}
