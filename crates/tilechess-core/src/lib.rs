//! Core types for tilechess.
//!
//! This crate provides the fundamental, dependency-free types shared by the
//! engine:
//! - [`Color`], [`Piece`], [`PieceClass`] and [`PieceType`] for pieces
//! - [`Square`] for board coordinates
//! - [`Move`] and [`MoveRecord`], the packed move and its undo record
//! - [`CastleRights`] and [`CastleSide`]
//! - [`Fen`] parsing and serialization

mod castle;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castle::{CastleRights, CastleSide};
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveRecord};
pub use piece::{Piece, PieceClass, PieceType};
pub use square::Square;
