//! Piece representation.
//!
//! [`Piece`] is the colourless kind of a piece. [`PieceType`] is what sits on
//! a tile: a kind together with its colour, or [`PieceType::Empty`]. Its
//! discriminant fits in four bits so it can be packed into moves.

use crate::Color;

/// The six kinds of pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Rook = 1,
    Knight = 2,
    Bishop = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// All piece kinds in order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Rook,
        Piece::Knight,
        Piece::Bishop,
        Piece::Queen,
        Piece::King,
    ];

    /// Kinds a pawn may promote to, in generation order.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Rook, Piece::Knight, Piece::Bishop, Piece::Queen];

    /// Returns the index of this kind (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the bitboard class of this kind. Kings have none.
    #[inline]
    pub const fn class(self) -> Option<PieceClass> {
        match self {
            Piece::Pawn => Some(PieceClass::Pawn),
            Piece::Knight | Piece::Bishop => Some(PieceClass::Minor),
            Piece::Rook | Piece::Queen => Some(PieceClass::Major),
            Piece::King => None,
        }
    }

    /// Returns true for bishops, rooks and queens.
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }

    /// Lowercase FEN letter.
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Rook => 'r',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// Parses a FEN letter of either case.
    pub const fn from_char(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'r' => Some(Piece::Rook),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Piece::Pawn => "Pawn",
            Piece::Rook => "Rook",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Queen => "Queen",
            Piece::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// Groups of pieces that share an occupancy bitboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceClass {
    Pawn = 0,
    /// Knights and bishops.
    Minor = 1,
    /// Rooks and queens.
    Major = 2,
}

impl PieceClass {
    pub const ALL: [PieceClass; 3] = [PieceClass::Pawn, PieceClass::Minor, PieceClass::Major];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Contents of a tile: empty, or a coloured piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PieceType {
    #[default]
    Empty = 0,
    BlackPawn = 1,
    BlackRook = 2,
    BlackKnight = 3,
    BlackBishop = 4,
    BlackQueen = 5,
    BlackKing = 6,
    WhitePawn = 7,
    WhiteRook = 8,
    WhiteKnight = 9,
    WhiteBishop = 10,
    WhiteQueen = 11,
    WhiteKing = 12,
}

impl PieceType {
    /// Number of distinct values, including `Empty`.
    pub const COUNT: usize = 13;

    /// Every non-empty piece type.
    pub const PIECES: [PieceType; 12] = [
        PieceType::BlackPawn,
        PieceType::BlackRook,
        PieceType::BlackKnight,
        PieceType::BlackBishop,
        PieceType::BlackQueen,
        PieceType::BlackKing,
        PieceType::WhitePawn,
        PieceType::WhiteRook,
        PieceType::WhiteKnight,
        PieceType::WhiteBishop,
        PieceType::WhiteQueen,
        PieceType::WhiteKing,
    ];

    /// Combines a kind and a colour.
    #[inline]
    pub const fn new(piece: Piece, color: Color) -> Self {
        let base = match color {
            Color::Black => 1,
            Color::White => 7,
        };
        match PieceType::from_index(base + piece as u8) {
            Some(pt) => pt,
            None => unreachable!(),
        }
    }

    /// Decodes a packed value (0-12).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        Some(match index {
            0 => PieceType::Empty,
            1 => PieceType::BlackPawn,
            2 => PieceType::BlackRook,
            3 => PieceType::BlackKnight,
            4 => PieceType::BlackBishop,
            5 => PieceType::BlackQueen,
            6 => PieceType::BlackKing,
            7 => PieceType::WhitePawn,
            8 => PieceType::WhiteRook,
            9 => PieceType::WhiteKnight,
            10 => PieceType::WhiteBishop,
            11 => PieceType::WhiteQueen,
            12 => PieceType::WhiteKing,
            _ => return None,
        })
    }

    /// Returns the packed value (0-12).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, PieceType::Empty)
    }

    /// Returns the colour, or `None` for an empty tile.
    #[inline]
    pub const fn color(self) -> Option<Color> {
        match self as u8 {
            0 => None,
            1..=6 => Some(Color::Black),
            _ => Some(Color::White),
        }
    }

    /// Returns the kind, or `None` for an empty tile.
    #[inline]
    pub const fn piece(self) -> Option<Piece> {
        match self as u8 {
            0 => None,
            n => Some(Piece::ALL[((n - 1) % 6) as usize]),
        }
    }

    /// Returns true if this is a piece of the given kind.
    #[inline]
    pub const fn is(self, piece: Piece) -> bool {
        match self.piece() {
            Some(p) => p as u8 == piece as u8,
            None => false,
        }
    }

    /// Returns true if this is a piece of the given colour.
    #[inline]
    pub const fn is_color(self, color: Color) -> bool {
        match self.color() {
            Some(c) => c as u8 == color as u8,
            None => false,
        }
    }

    /// FEN letter: uppercase for white, lowercase for black, `None` if empty.
    pub const fn to_fen_char(self) -> Option<char> {
        match (self.piece(), self.color()) {
            (Some(piece), Some(Color::White)) => Some(piece.to_char().to_ascii_uppercase()),
            (Some(piece), Some(Color::Black)) => Some(piece.to_char()),
            _ => None,
        }
    }

    /// Parses a FEN letter.
    pub const fn from_fen_char(c: char) -> Option<PieceType> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match Piece::from_char(c) {
            Some(piece) => Some(PieceType::new(piece, color)),
            None => None,
        }
    }
}
