//! The board representation, move generation and evaluation layer of the
//! SoFCheck chess engine.
//!
//! This package is separated into two parts. Firstly, the chess foundations
//! (the current crate, `sofcheck`): squares, bitboards, the [`Board`] with its
//! incrementally updated Zobrist hash, the pseudo-legal move generator, the
//! evaluator and the shared transposition table. Secondly, the searching AI
//! built on top of these foundations, `sofcheck_engine`.
//!
//! # Usage
//!
//! Before touching any board, the global lookup tables must be initialized
//! once:
//!
//! ```
//! sofcheck::init();
//! let board = sofcheck::Board::initial();
//! assert_eq!(board.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
//! ```
//!
//! Generating and applying moves:
//!
//! ```
//! use sofcheck::board::movegen::{MoveGen, is_move_legal};
//! use sofcheck::board::{move_make, move_unmake};
//! use sofcheck::MoveList;
//!
//! sofcheck::init();
//! let mut board = sofcheck::Board::initial();
//! let mut moves = MoveList::new();
//! MoveGen::new(&board).gen_all(&mut moves);
//! for &m in moves.iter() {
//!     if is_move_legal(&board, m) {
//!         let p = move_make(&mut board, m);
//!         move_unmake(&mut board, m, p);
//!     }
//! }
//! ```
//!
//! # Safety
//!
//! The hot paths assume their documented preconditions instead of checking
//! them in release builds. Inputs that break a precondition (applying a move
//! which is not pseudo-legal, probing squares above 63, and so on) are
//! undefined behavior; debug builds assert on them.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;

pub mod board;
pub mod core;
pub mod eval;
pub mod helper;
pub mod tools;

pub use crate::board::Board;
pub use crate::core::bitboard::BitBoard;
pub use crate::core::move_list::MoveList;
pub use crate::core::piece_move::{Move, MoveKind};
pub use crate::core::sq::SQ;
pub use crate::core::{Cell, Color, Piece};
pub use crate::helper::init;
