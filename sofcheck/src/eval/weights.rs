//! The evaluation weight bundle.
//!
//! Every tunable quantity of the evaluator is a *feature* with a fixed index;
//! [`WEIGHT_VALUES`] holds the embedded default value of each feature. The
//! typed [`Weights`] structure is built from the feature indices once per
//! score type: the integer instantiation reads the embedded values, while the
//! coefficient-vector instantiation records the indices themselves, which is
//! what the offline tuning pipeline consumes. The flat layout (named bundles
//! at fixed offsets) is stable across builds.
//!
//! [`WEIGHT_VALUES`]: static.WEIGHT_VALUES.html
//! [`Weights`]: struct.Weights.html

use super::coefs::{CoefVector, EvalPair, EvalScore};
use crate::core::bit_twiddles::reverse3;
use crate::core::score::Value;
use crate::core::sq::SQ;
use crate::core::{Cell, Color, Piece, CELL_CNT};

// ---------- Feature layout ----------

/// Midgame piece costs, one per piece kind.
pub const FEAT_PIECE_COST_MID: usize = 0;
/// Endgame piece costs, one per piece kind.
pub const FEAT_PIECE_COST_END: usize = 6;
/// Six piece-square tables of 64 entries each, piece-major.
pub const FEAT_PSQ_TABLE: usize = 12;
/// The endgame king table.
pub const FEAT_KING_END_TABLE: usize = FEAT_PSQ_TABLE + 6 * 64;

pub const FEAT_PAWN_ISOLATED: usize = FEAT_KING_END_TABLE + 64;
pub const FEAT_PAWN_DOUBLE: usize = FEAT_PAWN_ISOLATED + 1;
pub const FEAT_PAWN_PASSED: usize = FEAT_PAWN_DOUBLE + 1;
pub const FEAT_PAWN_OPEN: usize = FEAT_PAWN_PASSED + 1;
pub const FEAT_PAWN_CANDIDATE: usize = FEAT_PAWN_OPEN + 1;
pub const FEAT_PAWN_PROTECTED: usize = FEAT_PAWN_CANDIDATE + 1;
pub const FEAT_PAWN_BACKWARD: usize = FEAT_PAWN_PROTECTED + 1;

pub const FEAT_QUEEN_NEAR_KING: usize = FEAT_PAWN_BACKWARD + 1;
pub const FEAT_ROOK_NEAR_KING: usize = FEAT_QUEEN_NEAR_KING + 1;
pub const FEAT_TWO_BISHOPS: usize = FEAT_ROOK_NEAR_KING + 1;

pub const FEAT_ROOK_OPEN_COL: usize = FEAT_TWO_BISHOPS + 1;
pub const FEAT_ROOK_SEMI_OPEN_COL: usize = FEAT_ROOK_OPEN_COL + 1;
pub const FEAT_QUEEN_OPEN_COL: usize = FEAT_ROOK_SEMI_OPEN_COL + 1;
pub const FEAT_QUEEN_SEMI_OPEN_COL: usize = FEAT_QUEEN_OPEN_COL + 1;

/// King pawn-shield bundle: six shield bits (three on each of the two rows
/// in front of the king), a (mid, end) pair of features per bit.
pub const FEAT_KING_SHIELD: usize = FEAT_QUEEN_SEMI_OPEN_COL + 1;
/// King pawn-storm bundle, laid out like the shield bundle.
pub const FEAT_KING_STORM: usize = FEAT_KING_SHIELD + 12;

/// Total number of weight features.
pub const FEAT_COUNT: usize = FEAT_KING_STORM + 12;

// ---------- Embedded default values ----------

const PIECE_COST_MID: [Value; 6] = [100, 0, 320, 330, 500, 950];
const PIECE_COST_END: [Value; 6] = [125, 0, 330, 340, 520, 980];

// Piece-square tables, written with rank 8 first (matching the internal
// square numbering) from White's point of view.
#[rustfmt::skip]
const PSQ_TABLE: [[Value; 64]; 6] = [
    // Pawn
    [
          0,   0,   0,   0,   0,   0,   0,   0,
         50,  50,  50,  50,  50,  50,  50,  50,
         10,  10,  20,  30,  30,  20,  10,  10,
          5,   5,  10,  25,  25,  10,   5,   5,
          0,   0,   0,  20,  20,   0,   0,   0,
          5,  -5, -10,   0,   0, -10,  -5,   5,
          5,  10,  10, -20, -20,  10,  10,   5,
          0,   0,   0,   0,   0,   0,   0,   0,
    ],
    // King (midgame)
    [
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -20, -30, -30, -40, -40, -30, -30, -20,
        -10, -20, -20, -20, -20, -20, -20, -10,
         20,  20,   0,   0,   0,   0,  20,  20,
         20,  30,  10,   0,   0,  10,  30,  20,
    ],
    // Knight
    [
        -50, -40, -30, -30, -30, -30, -40, -50,
        -40, -20,   0,   0,   0,   0, -20, -40,
        -30,   0,  10,  15,  15,  10,   0, -30,
        -30,   5,  15,  20,  20,  15,   5, -30,
        -30,   0,  15,  20,  20,  15,   0, -30,
        -30,   5,  10,  15,  15,  10,   5, -30,
        -40, -20,   0,   5,   5,   0, -20, -40,
        -50, -40, -30, -30, -30, -30, -40, -50,
    ],
    // Bishop
    [
        -20, -10, -10, -10, -10, -10, -10, -20,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -10,   0,   5,  10,  10,   5,   0, -10,
        -10,   5,   5,  10,  10,   5,   5, -10,
        -10,   0,  10,  10,  10,  10,   0, -10,
        -10,  10,  10,  10,  10,  10,  10, -10,
        -10,   5,   0,   0,   0,   0,   5, -10,
        -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    // Rook
    [
          0,   0,   0,   0,   0,   0,   0,   0,
          5,  10,  10,  10,  10,  10,  10,   5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
          0,   0,   0,   5,   5,   0,   0,   0,
    ],
    // Queen
    [
        -20, -10, -10,  -5,  -5, -10, -10, -20,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -10,   0,   5,   5,   5,   5,   0, -10,
         -5,   0,   5,   5,   5,   5,   0,  -5,
          0,   0,   5,   5,   5,   5,   0,  -5,
        -10,   5,   5,   5,   5,   5,   0, -10,
        -10,   0,   5,   0,   0,   0,   0, -10,
        -20, -10, -10,  -5,  -5, -10, -10, -20,
    ],
];

#[rustfmt::skip]
const KING_END_TABLE: [Value; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];

const PAWN_WEIGHTS: [Value; 7] = [-10, -12, 25, 8, 15, 7, -8];
const NEAR_KING_WEIGHTS: [Value; 2] = [-8, -4];
const TWO_BISHOPS_WEIGHT: Value = 30;
const OPEN_COL_WEIGHTS: [Value; 4] = [20, 10, 6, 4];

// (mid, end) per shield bit: the two rows in front of the king, files
// king-1, king, king+1.
const KING_SHIELD_WEIGHTS: [(Value, Value); 6] =
    [(12, 2), (14, 2), (12, 2), (6, 1), (7, 1), (6, 1)];
const KING_STORM_WEIGHTS: [(Value, Value); 6] =
    [(-8, -2), (-10, -2), (-8, -2), (-4, -1), (-5, -1), (-4, -1)];

const fn build_weight_values() -> [Value; FEAT_COUNT] {
    let mut values = [0 as Value; FEAT_COUNT];
    let mut p = 0;
    while p < 6 {
        values[FEAT_PIECE_COST_MID + p] = PIECE_COST_MID[p];
        values[FEAT_PIECE_COST_END + p] = PIECE_COST_END[p];
        let mut sq = 0;
        while sq < 64 {
            values[FEAT_PSQ_TABLE + p * 64 + sq] = PSQ_TABLE[p][sq];
            sq += 1;
        }
        p += 1;
    }
    let mut sq = 0;
    while sq < 64 {
        values[FEAT_KING_END_TABLE + sq] = KING_END_TABLE[sq];
        sq += 1;
    }
    let mut i = 0;
    while i < 7 {
        values[FEAT_PAWN_ISOLATED + i] = PAWN_WEIGHTS[i];
        i += 1;
    }
    values[FEAT_QUEEN_NEAR_KING] = NEAR_KING_WEIGHTS[0];
    values[FEAT_ROOK_NEAR_KING] = NEAR_KING_WEIGHTS[1];
    values[FEAT_TWO_BISHOPS] = TWO_BISHOPS_WEIGHT;
    let mut i = 0;
    while i < 4 {
        values[FEAT_ROOK_OPEN_COL + i] = OPEN_COL_WEIGHTS[i];
        i += 1;
    }
    let mut i = 0;
    while i < 6 {
        values[FEAT_KING_SHIELD + 2 * i] = KING_SHIELD_WEIGHTS[i].0;
        values[FEAT_KING_SHIELD + 2 * i + 1] = KING_SHIELD_WEIGHTS[i].1;
        values[FEAT_KING_STORM + 2 * i] = KING_STORM_WEIGHTS[i].0;
        values[FEAT_KING_STORM + 2 * i + 1] = KING_STORM_WEIGHTS[i].1;
        i += 1;
    }
    values
}

/// The embedded default value of every weight feature.
pub static WEIGHT_VALUES: [Value; FEAT_COUNT] = build_weight_values();

// ---------- Typed weight tables ----------

/// The evaluation weights instantiated for a score type.
pub struct Weights<S: EvalScore> {
    /// Piece-square pairs, cell-major (`cell * 64 + sq`). Black entries are
    /// the negated, rank-flipped White entries.
    pub psq: Vec<S::Pair>,
    /// Piece-square delta applied by a kingside castling, per color.
    pub psq_kingside_upd: Vec<S::Pair>,
    /// Piece-square delta applied by a queenside castling, per color.
    pub psq_queenside_upd: Vec<S::Pair>,

    pub pawn_isolated: S,
    pub pawn_double: S,
    pub pawn_passed: S,
    pub pawn_open: S,
    pub pawn_candidate: S,
    pub pawn_protected: S,
    pub pawn_backward: S,

    pub queen_near_king: S,
    pub rook_near_king: S,
    pub two_bishops: S,

    pub rook_open_col: S,
    pub rook_semi_open_col: S,
    pub queen_open_col: S,
    pub queen_semi_open_col: S,

    /// Shield table indexed by `mask1 * 8 + mask2` (the pawn masks of the
    /// two rows in front of the king).
    pub king_shield: Vec<S::Pair>,
    /// Shield table with the file masks mirrored, for a king on the
    /// kingside.
    pub king_shield_inv: Vec<S::Pair>,
    pub king_storm: Vec<S::Pair>,
    pub king_storm_inv: Vec<S::Pair>,
}

fn psq_pair_for_white<S: EvalScore>(piece: Piece, sq: SQ) -> S::Pair {
    let p = piece as usize;
    let mid = S::weight(FEAT_PIECE_COST_MID + p) + S::weight(FEAT_PSQ_TABLE + p * 64 + sq.0 as usize);
    let end_table = if piece == Piece::King {
        S::weight(FEAT_KING_END_TABLE + sq.0 as usize)
    } else {
        S::weight(FEAT_PSQ_TABLE + p * 64 + sq.0 as usize)
    };
    let end = S::weight(FEAT_PIECE_COST_END + p) + end_table;
    S::Pair::from_parts(mid, end)
}

fn masked_sum<S: EvalScore>(base_feature: usize, offset: usize, mask: usize) -> S::Pair {
    let mut sum = S::Pair::default();
    for bit in 0..3 {
        if mask & (1 << bit) != 0 {
            let idx = base_feature + 2 * (offset + bit);
            sum += S::Pair::from_parts(S::weight(idx), S::weight(idx + 1));
        }
    }
    sum
}

impl<S: EvalScore> Weights<S> {
    /// Piece-square pair of a cell standing on a square.
    #[inline(always)]
    pub fn psq(&self, cell: Cell, sq: SQ) -> &S::Pair {
        &self.psq[(cell as usize) * 64 + sq.0 as usize]
    }

    pub fn build() -> Weights<S> {
        let mut psq = vec![S::Pair::default(); CELL_CNT * 64];
        for piece_idx in 0..6u8 {
            let piece = crate::core::ALL_PIECES[piece_idx as usize];
            for sq_idx in 0..64u8 {
                let sq = SQ(sq_idx);
                let white_cell = Cell::make(Color::White, piece);
                let black_cell = Cell::make(Color::Black, piece);
                let white = psq_pair_for_white::<S>(piece, sq);
                psq[(white_cell as usize) * 64 + sq.0 as usize] = white;
                let flipped = psq_pair_for_white::<S>(piece, sq.flip_rank());
                psq[(black_cell as usize) * 64 + sq.0 as usize] = -flipped;
            }
        }

        let mut psq_kingside_upd = Vec::with_capacity(2);
        let mut psq_queenside_upd = Vec::with_capacity(2);
        for &color in [Color::White, Color::Black].iter() {
            let row = color.castling_row();
            let king = Cell::make(color, Piece::King);
            let rook = Cell::make(color, Piece::Rook);
            let at = |cell: Cell, file: u8| psq[(cell as usize) * 64 + SQ::make(file, row).0 as usize].clone();
            psq_kingside_upd
                .push(at(king, 6) - at(king, 4) + at(rook, 5) - at(rook, 7));
            psq_queenside_upd
                .push(at(king, 2) - at(king, 4) + at(rook, 3) - at(rook, 0));
        }

        let shield_table = |base: usize, inverted: bool| -> Vec<S::Pair> {
            let mut table = vec![S::Pair::default(); 64];
            for m1 in 0..8usize {
                for m2 in 0..8usize {
                    let (e1, e2) = if inverted {
                        (reverse3(m1), reverse3(m2))
                    } else {
                        (m1, m2)
                    };
                    table[m1 * 8 + m2] =
                        masked_sum::<S>(base, 0, e1) + masked_sum::<S>(base, 3, e2);
                }
            }
            table
        };

        Weights {
            psq,
            psq_kingside_upd,
            psq_queenside_upd,
            pawn_isolated: S::weight(FEAT_PAWN_ISOLATED),
            pawn_double: S::weight(FEAT_PAWN_DOUBLE),
            pawn_passed: S::weight(FEAT_PAWN_PASSED),
            pawn_open: S::weight(FEAT_PAWN_OPEN),
            pawn_candidate: S::weight(FEAT_PAWN_CANDIDATE),
            pawn_protected: S::weight(FEAT_PAWN_PROTECTED),
            pawn_backward: S::weight(FEAT_PAWN_BACKWARD),
            queen_near_king: S::weight(FEAT_QUEEN_NEAR_KING),
            rook_near_king: S::weight(FEAT_ROOK_NEAR_KING),
            two_bishops: S::weight(FEAT_TWO_BISHOPS),
            rook_open_col: S::weight(FEAT_ROOK_OPEN_COL),
            rook_semi_open_col: S::weight(FEAT_ROOK_SEMI_OPEN_COL),
            queen_open_col: S::weight(FEAT_QUEEN_OPEN_COL),
            queen_semi_open_col: S::weight(FEAT_QUEEN_SEMI_OPEN_COL),
            king_shield: shield_table(FEAT_KING_SHIELD, false),
            king_shield_inv: shield_table(FEAT_KING_SHIELD, true),
            king_storm: shield_table(FEAT_KING_STORM, false),
            king_storm_inv: shield_table(FEAT_KING_STORM, true),
        }
    }
}

lazy_static! {
    static ref WEIGHTS_VALUE: Weights<Value> = Weights::build();
    static ref WEIGHTS_COEF: Weights<CoefVector> = Weights::build();
}

/// Typed access to the weight tables of a score type.
pub trait HasWeights: EvalScore {
    fn weights() -> &'static Weights<Self>;
}

impl HasWeights for Value {
    #[inline(always)]
    fn weights() -> &'static Weights<Value> {
        &WEIGHTS_VALUE
    }
}

impl HasWeights for CoefVector {
    #[inline(always)]
    fn weights() -> &'static Weights<CoefVector> {
        &WEIGHTS_COEF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::score::ScorePair;

    #[test]
    fn psq_is_antisymmetric() {
        let w = <Value as HasWeights>::weights();
        for &piece in crate::core::ALL_PIECES.iter() {
            for sq_idx in 0..64u8 {
                let sq = SQ(sq_idx);
                let white = *w.psq(Cell::make(Color::White, piece), sq);
                let black = *w.psq(Cell::make(Color::Black, piece), sq.flip_rank());
                assert_eq!(white, -black, "{:?} at {}", piece, sq);
            }
        }
    }

    #[test]
    fn castling_update_matches_cells() {
        let w = <Value as HasWeights>::weights();
        let king = Cell::WhiteKing;
        let rook = Cell::WhiteRook;
        let expected: ScorePair = *w.psq(king, SQ::G1) - *w.psq(king, SQ::E1)
            + *w.psq(rook, SQ::F1)
            - *w.psq(rook, SQ::H1);
        assert_eq!(w.psq_kingside_upd[Color::White as usize], expected);
    }

    #[test]
    fn coef_weights_are_unit_vectors() {
        let w = <CoefVector as HasWeights>::weights();
        assert_eq!(w.two_bishops.coef(FEAT_TWO_BISHOPS), 1);
        assert_eq!(w.pawn_passed.coef(FEAT_PAWN_PASSED), 1);
        assert_eq!(w.pawn_passed.coef(FEAT_PAWN_OPEN), 0);
    }

    #[test]
    fn shield_inv_mirrors() {
        let w = <Value as HasWeights>::weights();
        // The mirrored table swaps bits 0 and 2 of each mask.
        assert_eq!(w.king_shield[0b001 * 8], w.king_shield_inv[0b100 * 8]);
        assert_eq!(w.king_shield[0b010 * 8 + 0b010], w.king_shield_inv[0b010 * 8 + 0b010]);
    }
}
