//! Zobrist keys for hashing positions.
//!
//! The board hash is the XOR of: a key per piece per square, a key for the
//! side to move (only when Black moves), a key per castling-rights mask, and
//! a key for the en-passant square when one is set. The keys come from the
//! deterministic [`PRNG`], so hashes agree across builds.
//!
//! [`PRNG`]: ../../tools/prng/struct.PRNG.html

use crate::core::sq::SQ;
use crate::core::{Cell, Color, Piece, CELL_CNT, SQ_CNT};
use crate::tools::prng::PRNG;

/// Seed for the Zobrist pseudo-random number generator.
const ZOBRIST_SEED: u64 = 23_081;

pub struct Zobrist {
    pub pieces: [[u64; SQ_CNT]; CELL_CNT],
    pub castling: [u64; 16],
    pub enpassant: [u64; SQ_CNT],
    pub side: u64,
    /// Combined key delta of the four cell changes a kingside castling makes,
    /// per color.
    pub castling_kingside_delta: [u64; 2],
    /// The same for queenside castling.
    pub castling_queenside_delta: [u64; 2],
}

impl Zobrist {
    pub fn new() -> Zobrist {
        let mut rng = PRNG::init(ZOBRIST_SEED);
        let mut z = Zobrist {
            pieces: [[0; SQ_CNT]; CELL_CNT],
            castling: [0; 16],
            enpassant: [0; SQ_CNT],
            side: 0,
            castling_kingside_delta: [0; 2],
            castling_queenside_delta: [0; 2],
        };

        for cell_idx in 0..CELL_CNT as u8 {
            if Cell::from_index(cell_idx).is_none() {
                continue;
            }
            for sq in 0..SQ_CNT {
                z.pieces[cell_idx as usize][sq] = rng.rand();
            }
        }

        // A castling mask hashes as the XOR of its single rights, so that
        // toggling one right is one XOR.
        let mut single = [0u64; 4];
        for s in single.iter_mut() {
            *s = rng.rand();
        }
        for mask in 0..16usize {
            for (bit, s) in single.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    z.castling[mask] ^= s;
                }
            }
        }

        for sq in 0..SQ_CNT {
            z.enpassant[sq] = rng.rand();
        }
        z.side = rng.rand();

        for &color in [Color::White, Color::Black].iter() {
            let row = color.castling_row();
            let king = Cell::make(color, Piece::King) as usize;
            let rook = Cell::make(color, Piece::Rook) as usize;
            let sq = |file: u8| SQ::make(file, row).0 as usize;
            z.castling_kingside_delta[color as usize] = z.pieces[king][sq(4)]
                ^ z.pieces[king][sq(6)]
                ^ z.pieces[rook][sq(7)]
                ^ z.pieces[rook][sq(5)];
            z.castling_queenside_delta[color as usize] = z.pieces[king][sq(4)]
                ^ z.pieces[king][sq(2)]
                ^ z.pieces[rook][sq(0)]
                ^ z.pieces[rook][sq(3)];
        }

        z
    }

    /// Key of the piece in `cell` standing on `sq`. The empty cell hashes to
    /// zero.
    #[inline(always)]
    pub fn piece(&self, cell: Cell, sq: SQ) -> u64 {
        debug_assert!(sq.is_okay());
        self.pieces[cell as usize][sq.0 as usize]
    }

    /// Key of the given en-passant square.
    #[inline(always)]
    pub fn ep(&self, sq: SQ) -> u64 {
        debug_assert!(sq.is_okay());
        self.enpassant[sq.0 as usize]
    }

    /// Key of the given castling mask.
    #[inline(always)]
    pub fn castling_mask(&self, mask: u8) -> u64 {
        self.castling[(mask & 0xf) as usize]
    }
}

/// A 64-bit hash of the two pawn bitboards, keying the pawn-structure cache.
#[inline]
pub fn pawn_hash(bb_white_pawns: u64, bb_black_pawns: u64) -> u64 {
    // A cheap strong mix of two words (the multiply-xorshift construction).
    let mut h = bb_white_pawns.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    h ^= h >> 29;
    h = h.wrapping_add(bb_black_pawns).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h ^= h >> 32;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct() {
        let z = Zobrist::new();
        assert_ne!(z.piece(Cell::WhitePawn, SQ::E2), 0);
        assert_ne!(
            z.piece(Cell::WhitePawn, SQ::E2),
            z.piece(Cell::BlackPawn, SQ::E2)
        );
        assert_ne!(z.castling_mask(0b0001), z.castling_mask(0b0010));
        // The full mask is the XOR of the single rights.
        assert_eq!(
            z.castling_mask(0b1111),
            z.castling_mask(0b0001)
                ^ z.castling_mask(0b0010)
                ^ z.castling_mask(0b0100)
                ^ z.castling_mask(0b1000)
        );
        assert_eq!(z.castling_mask(0), 0);
    }

    #[test]
    fn xor_in_out_restores() {
        let z = Zobrist::new();
        let mut h = 0xdead_beefu64;
        let key = z.piece(Cell::BlackRook, SQ::A8);
        h ^= key;
        h ^= key;
        assert_eq!(h, 0xdead_beef);
    }

    #[test]
    fn castling_delta_matches_cells() {
        let z = Zobrist::new();
        let king = Cell::WhiteKing;
        let rook = Cell::WhiteRook;
        let expect = z.piece(king, SQ::E1)
            ^ z.piece(king, SQ::G1)
            ^ z.piece(rook, SQ::H1)
            ^ z.piece(rook, SQ::F1);
        assert_eq!(z.castling_kingside_delta[Color::White as usize], expect);
    }
}
