//! Reversible chess position engine.
//!
//! This crate provides:
//! - [`Position`] - mailbox, piece lists and bitboards kept in lockstep, with
//!   FEN import/export
//! - Pseudo-legal move generation in [`movegen`] and the apply/revert
//!   mutator on [`Position`], which filters it down to legal moves
//! - [`Hasher`] - order-independent position fingerprints
//! - [`search`] - fixed-depth alpha-beta search
//! - [`JobScheduler`] - background workers for running searches
//! - [`Game`] - the query and mutation surface for a user interface
//! - [`EngineConfig`] - TOML configuration
//!
//! # Example
//!
//! ```
//! use tilechess_engine::{Game, Position};
//! use tilechess_engine::movegen::perft::perft;
//!
//! let mut position = Position::startpos();
//! assert_eq!(perft(&mut position, 2).nodes, 400);
//!
//! let mut game = Game::new();
//! let e2 = tilechess_core::Square::from_algebraic("e2").unwrap();
//! let e4 = tilechess_core::Square::from_algebraic("e4").unwrap();
//! let mv = game.legal_destinations(e2)[&e4];
//! game.apply_move(mv).unwrap();
//! println!("Position after 1.e4: {}", game.fen());
//! ```

mod bitboard;
mod config;
mod game;
pub mod movegen;
mod mutator;
mod piece_list;
mod position;
mod scheduler;
pub mod search;
mod zobrist;

pub use bitboard::Bitboard;
pub use config::{ConfigError, EngineConfig};
pub use game::{Game, GameError};
pub use movegen::perft::{perft, perft_divide, PerftStats};
pub use movegen::{generate_moves, generate_moves_from, is_attacked, is_king_attacked, MoveList};
pub use mutator::MoveError;
pub use piece_list::PIECE_LIST_CAPACITY;
pub use position::{HistoryEntry, Position};
pub use scheduler::{worker_count, JobScheduler};
pub use search::{submit_search, SearchOutcome, Searcher, MATE_SCORE};
pub use zobrist::{Hasher, ZobristKeys, ZOBRIST};
