//! The SoFCheck chess engine.
//!
//! This crate builds the searching AI on top of the `sofcheck` chess
//! foundations: the iterative-deepening alpha-beta [`search`], the
//! multi-threaded [`runner`] that drives it, and the [`uci`] protocol front
//! end. The crate is mostly useful as a direct executable; if you are
//! interested in the chess library functions (boards, move generation and
//! so on), depend on `sofcheck` instead.
//!
//! [`search`]: search/index.html
//! [`runner`]: runner/index.html
//! [`uci`]: uci/index.html

#[macro_use]
extern crate bitflags;

pub mod consts;
pub mod engine;
pub mod movepick;
pub mod runner;
pub mod search;
pub mod sync;
pub mod tables;
pub mod time;
pub mod uci;

pub use crate::consts::*;
