//! Free lookup functions over the global precomputed tables. Call
//! [`init_statics`] (or the crate-level `init()`) once before using any of
//! them, or before touching any `Board`.
//!
//! [`init_statics`]: fn.init_statics.html

use super::boards::NearAttacks;
use super::magic::MagicTables;
use super::zobrist::Zobrist;
use crate::core::bitboard::BitBoard;
use crate::core::sq::SQ;
use crate::core::{Cell, Color};

lazy_static! {
    /// Statically initialized lookup tables, created on first use. Nothing
    /// in here is ever mutated, so sharing between threads is safe.
    static ref NEAR: NearAttacks = NearAttacks::new();
    static ref MAGIC: MagicTables = MagicTables::new();
    static ref ZOBRIST: Zobrist = Zobrist::new();
}

/// Forces initialization of all global tables. Idempotent; the first call is
/// expensive (the magic search), every later call is a no-op.
#[cold]
pub fn init_statics() {
    lazy_static::initialize(&NEAR);
    lazy_static::initialize(&MAGIC);
    lazy_static::initialize(&ZOBRIST);
}

/// Attacks of a king standing on `sq`.
#[inline(always)]
pub fn king_attacks(sq: SQ) -> BitBoard {
    BitBoard(NEAR.king[sq.0 as usize])
}

/// Attacks of a knight standing on `sq`.
#[inline(always)]
pub fn knight_attacks(sq: SQ) -> BitBoard {
    BitBoard(NEAR.knight[sq.0 as usize])
}

/// Squares attacked by a pawn of color `c` standing on `sq`.
#[inline(always)]
pub fn pawn_attacks(c: Color, sq: SQ) -> BitBoard {
    match c {
        Color::White => BitBoard(NEAR.white_pawn[sq.0 as usize]),
        Color::Black => BitBoard(NEAR.black_pawn[sq.0 as usize]),
    }
}

/// Attacks of a bishop standing on `sq`, with occupancy `occ`.
#[inline(always)]
pub fn bishop_attacks(occ: BitBoard, sq: SQ) -> BitBoard {
    BitBoard(MAGIC.bishop_attacks(occ.0, sq.0))
}

/// Attacks of a rook standing on `sq`, with occupancy `occ`.
#[inline(always)]
pub fn rook_attacks(occ: BitBoard, sq: SQ) -> BitBoard {
    BitBoard(MAGIC.rook_attacks(occ.0, sq.0))
}

/// Attacks of a queen standing on `sq`, with occupancy `occ`.
#[inline(always)]
pub fn queen_attacks(occ: BitBoard, sq: SQ) -> BitBoard {
    bishop_attacks(occ, sq) | rook_attacks(occ, sq)
}

/// The set of squares strictly between two colinear squares; empty when the
/// squares do not share a row, file or diagonal.
#[inline(always)]
pub fn between(a: SQ, b: SQ) -> BitBoard {
    BitBoard(NEAR.between[a.0 as usize][b.0 as usize])
}

/// Zobrist key of the piece in `cell` standing on `sq`.
#[inline(always)]
pub fn z_piece(cell: Cell, sq: SQ) -> u64 {
    ZOBRIST.piece(cell, sq)
}

/// Zobrist key of the en-passant square `sq`.
#[inline(always)]
pub fn z_ep(sq: SQ) -> u64 {
    ZOBRIST.ep(sq)
}

/// Zobrist key of a castling-rights mask.
#[inline(always)]
pub fn z_castling(mask: u8) -> u64 {
    ZOBRIST.castling_mask(mask)
}

/// Zobrist key of the side to move (XORed in when Black moves).
#[inline(always)]
pub fn z_side() -> u64 {
    ZOBRIST.side
}

/// Combined Zobrist delta of a kingside castling of color `c`.
#[inline(always)]
pub fn z_castling_kingside_delta(c: Color) -> u64 {
    ZOBRIST.castling_kingside_delta[c as usize]
}

/// Combined Zobrist delta of a queenside castling of color `c`.
#[inline(always)]
pub fn z_castling_queenside_delta(c: Color) -> u64 {
    ZOBRIST.castling_queenside_delta[c as usize]
}
