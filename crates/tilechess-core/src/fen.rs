//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! Only the placement field is mandatory. Trailing fields that are left out
//! take the values of `w - - 0 1`.

use crate::{CastleRights, Color, PieceType, Square};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when reading a FEN string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 1 to 6 fields, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: usize },

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),
}

/// The decoded fields of a FEN string.
///
/// This holds the board exactly as written; the engine turns it into its own
/// position representation and performs the structural checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Tile contents indexed by square (a1 = 0).
    pub placement: [PieceType; 64],
    pub side_to_move: Color,
    pub castling: CastleRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Fen {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string. Fields after the placement are optional.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() || parts.len() > 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = Self::parse_placement(parts[0])?;

        let side_to_move = match parts.get(1).copied().unwrap_or("w") {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling_field = parts.get(2).copied().unwrap_or("-");
        let castling = CastleRights::from_fen(castling_field)
            .ok_or_else(|| FenError::InvalidCastlingRights(castling_field.to_string()))?;

        let en_passant = Self::parse_en_passant(parts.get(3).copied().unwrap_or("-"), side_to_move)?;

        let halfmove_field = parts.get(4).copied().unwrap_or("0");
        let halfmove_clock = halfmove_field
            .parse::<u16>()
            .map_err(|_| FenError::InvalidHalfmoveClock(halfmove_field.to_string()))?;

        let fullmove_field = parts.get(5).copied().unwrap_or("1");
        let fullmove_number = fullmove_field
            .parse::<u16>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| FenError::InvalidFullmoveNumber(fullmove_field.to_string()))?;

        Ok(Fen {
            placement,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(field: &str) -> Result<[PieceType; 64], FenError> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut placement = [PieceType::Empty; 64];
        for (i, rank_str) in ranks.iter().enumerate() {
            // FEN lists rank 8 first
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as u8;
                } else if let Some(pt) = PieceType::from_fen_char(c) {
                    let sq = Square::from_coords(file, rank).ok_or_else(|| {
                        FenError::InvalidPiecePlacement(format!(
                            "rank {} has more than 8 squares",
                            rank + 1
                        ))
                    })?;
                    placement[sq.index() as usize] = pt;
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
                if file > 8 {
                    break;
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank + 1,
                    file
                )));
            }
        }
        Ok(placement)
    }

    fn parse_en_passant(field: &str, side_to_move: Color) -> Result<Option<Square>, FenError> {
        if field == "-" {
            return Ok(None);
        }
        // The target sits behind a pawn that just double-pushed, so its rank
        // is fixed by whoever is to move now.
        let expected_rank = match side_to_move {
            Color::White => 5,
            Color::Black => 2,
        };
        match Square::from_algebraic(field) {
            Some(sq) if sq.rank() == expected_rank => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
        }
    }

    /// Serializes a placement array to the first FEN field.
    pub fn placement_to_string(placement: &[PieceType; 64]) -> String {
        let mut out = String::with_capacity(71);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let idx = (rank * 8 + file) as usize;
                match placement[idx].to_fen_char() {
                    Some(c) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), Square::to_algebraic);
        write!(
            f,
            "{} {} {} {} {} {}",
            Self::placement_to_string(&self.placement),
            self.side_to_move.to_fen_char(),
            self.castling.to_fen(),
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for Fen {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}
