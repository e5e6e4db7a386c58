//! Per-piece-type square lists.
//!
//! Every occupied square appears in exactly one list, the one for the piece
//! standing on it. A per-square slot index gives O(1) removal by moving the
//! last entry of the list into the freed slot, so list order carries no
//! meaning and equality compares the lists as sets.

use tilechess_core::{PieceType, Square};

/// Most pieces of one type a position may hold (two rooks plus eight
/// promotions is the worst legal case).
pub const PIECE_LIST_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy)]
struct PieceList {
    squares: [Square; PIECE_LIST_CAPACITY],
    len: u8,
}

impl PieceList {
    const EMPTY: PieceList = PieceList {
        squares: [Square::A1; PIECE_LIST_CAPACITY],
        len: 0,
    };

    fn as_slice(&self) -> &[Square] {
        &self.squares[..self.len as usize]
    }

    fn mask(&self) -> u64 {
        self.as_slice().iter().fold(0, |acc, sq| acc | sq.bitboard())
    }
}

/// The thirteen piece lists of a position (index 0, `Empty`, stays unused).
#[derive(Debug, Clone)]
pub struct PieceLists {
    lists: [PieceList; PieceType::COUNT],
    slot: [u8; 64],
}

impl PieceLists {
    pub fn new() -> Self {
        PieceLists {
            lists: [PieceList::EMPTY; PieceType::COUNT],
            slot: [0; 64],
        }
    }

    /// Squares holding `piece`, in no particular order.
    #[inline]
    pub fn get(&self, piece: PieceType) -> &[Square] {
        self.lists[piece.index()].as_slice()
    }

    /// Number of `piece` on the board.
    #[inline]
    pub fn count(&self, piece: PieceType) -> usize {
        self.lists[piece.index()].len as usize
    }

    /// Returns true if `sq` is recorded in the list of `piece`.
    pub fn contains(&self, piece: PieceType, sq: Square) -> bool {
        let list = &self.lists[piece.index()];
        let slot = self.slot[sq.index() as usize] as usize;
        slot < list.len as usize && list.squares[slot] == sq
    }

    /// Appends `sq` to the list of `piece`. Returns false if the list is full
    /// or `piece` is `Empty`.
    pub fn add(&mut self, piece: PieceType, sq: Square) -> bool {
        if piece.is_empty() {
            return false;
        }
        let list = &mut self.lists[piece.index()];
        let len = list.len as usize;
        if len == PIECE_LIST_CAPACITY {
            return false;
        }
        list.squares[len] = sq;
        list.len += 1;
        self.slot[sq.index() as usize] = len as u8;
        true
    }

    /// Removes `sq` from the list of `piece`. Returns false if it was not
    /// there.
    pub fn remove(&mut self, piece: PieceType, sq: Square) -> bool {
        if !self.contains(piece, sq) {
            return false;
        }
        let slot = self.slot[sq.index() as usize] as usize;
        let list = &mut self.lists[piece.index()];
        let last = list.len as usize - 1;
        let moved = list.squares[last];
        list.squares[slot] = moved;
        list.len -= 1;
        self.slot[moved.index() as usize] = slot as u8;
        true
    }

    /// Moves an entry of `piece` from `from` to `to`, keeping its slot.
    /// Returns false if `from` was not in the list.
    pub fn relocate(&mut self, piece: PieceType, from: Square, to: Square) -> bool {
        if !self.contains(piece, from) {
            return false;
        }
        let slot = self.slot[from.index() as usize];
        self.lists[piece.index()].squares[slot as usize] = to;
        self.slot[to.index() as usize] = slot;
        true
    }

    /// Total number of entries across all lists.
    pub fn total(&self) -> usize {
        self.lists.iter().map(|l| l.len as usize).sum()
    }
}

impl Default for PieceLists {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PieceLists {
    fn eq(&self, other: &Self) -> bool {
        self.lists
            .iter()
            .zip(other.lists.iter())
            .all(|(a, b)| a.len == b.len && a.mask() == b.mask())
    }
}

impl Eq for PieceLists {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn add_and_remove_swaps_with_last() {
        let mut lists = PieceLists::new();
        let pawn = PieceType::WhitePawn;
        for s in ["a2", "b2", "c2"] {
            assert!(lists.add(pawn, sq(s)));
        }
        assert!(lists.remove(pawn, sq("a2")));
        assert_eq!(lists.get(pawn), &[sq("c2"), sq("b2")]);
        assert!(lists.contains(pawn, sq("c2")));
        assert!(!lists.contains(pawn, sq("a2")));
        assert!(!lists.remove(pawn, sq("a2")));
    }

    #[test]
    fn contains_checks_the_right_list() {
        let mut lists = PieceLists::new();
        lists.add(PieceType::WhiteRook, sq("a1"));
        assert!(lists.contains(PieceType::WhiteRook, sq("a1")));
        assert!(!lists.contains(PieceType::BlackRook, sq("a1")));
        assert!(!lists.remove(PieceType::BlackRook, sq("a1")));
    }

    #[test]
    fn relocate_keeps_slot() {
        let mut lists = PieceLists::new();
        lists.add(PieceType::BlackKnight, sq("b8"));
        lists.add(PieceType::BlackKnight, sq("g8"));
        assert!(lists.relocate(PieceType::BlackKnight, sq("b8"), sq("c6")));
        assert_eq!(lists.get(PieceType::BlackKnight), &[sq("c6"), sq("g8")]);
        assert!(!lists.relocate(PieceType::BlackKnight, sq("b8"), sq("a6")));
    }

    #[test]
    fn equality_ignores_order() {
        let mut a = PieceLists::new();
        let mut b = PieceLists::new();
        a.add(PieceType::WhitePawn, sq("a2"));
        a.add(PieceType::WhitePawn, sq("b2"));
        b.add(PieceType::WhitePawn, sq("b2"));
        b.add(PieceType::WhitePawn, sq("a2"));
        assert_eq!(a, b);
        b.remove(PieceType::WhitePawn, sq("a2"));
        assert_ne!(a, b);
    }

    #[test]
    fn refuses_empty_and_overflow() {
        let mut lists = PieceLists::new();
        assert!(!lists.add(PieceType::Empty, sq("a1")));
        for idx in 0..PIECE_LIST_CAPACITY as u8 {
            assert!(lists.add(PieceType::WhiteQueen, Square::from_index(idx).unwrap()));
        }
        assert!(!lists.add(PieceType::WhiteQueen, sq("h8")));
        assert_eq!(lists.total(), PIECE_LIST_CAPACITY);
    }
}
