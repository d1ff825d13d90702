//! The position evaluator.
//!
//! The evaluator keeps an incrementally maintained [`Tag`] per position: the
//! summed piece-square pair plus a material-based game-stage counter. On top
//! of the tag, [`Evaluator::eval_for_white`] adds king safety, the
//! two-bishops bonus, the (cached) pawn-structure score and the open-file
//! bonuses.
//!
//! The code is generic over the score type (see [`coefs`]): the integer
//! instantiation plays, the coefficient-vector instantiation feeds the
//! offline weight tuner.
//!
//! [`Tag`]: struct.Tag.html
//! [`Evaluator::eval_for_white`]: struct.Evaluator.html#method.eval_for_white
//! [`coefs`]: coefs/index.html

pub mod bitboards;
pub mod coefs;
pub mod pawn_cache;
pub mod weights;

pub use self::coefs::{CoefVector, EvalPair, EvalScore, COEF_UNIT, COEF_UNIT_SHIFT};
pub use self::weights::HasWeights;

use self::bitboards::{EvalBitboards, BB_BLACK_SHIELDED_KING, BB_WHITE_SHIELDED_KING};
use self::pawn_cache::{PawnCache, PawnCacheValue};
use crate::board::Board;
use crate::core::bit_twiddles::{byte_gather, byte_scatter, popcount64};
use crate::core::masks::BB_ROW;
use crate::core::piece_move::{enpassant_pawn_pos, Move, MoveKind};
use crate::core::score::Value;
use crate::core::sq::SQ;
use crate::core::{Cell, Color, Piece};
use crate::helper::boards::{advance_pawn_forward, advance_pawn_left, advance_pawn_right};
use crate::helper::zobrist::pawn_hash;

/// Game-stage contribution per cell value.
const STAGES: [u32; 15] = [0, 0, 0, 1, 1, 2, 4, 0, 0, 0, 0, 1, 1, 2, 4];

/// Total stage of the starting position.
const STAGE_TOTAL: u32 = 24;

/// Weighting of enemy heavy pieces at Chebyshev distance 1, 2 and 3 from the
/// king.
const KING_ZONE_COST: [u32; 4] = [0, 5, 4, 1];

lazy_static! {
    static ref EVAL_BB: EvalBitboards = EvalBitboards::new();
}

/// Forces initialization of the evaluator's global tables.
#[cold]
pub fn init_eval_statics() {
    ::lazy_static::initialize(&EVAL_BB);
    let _ = <Value as HasWeights>::weights();
    let _ = <CoefVector as HasWeights>::weights();
}

/// The incremental evaluation summary of a board: the summed piece-square
/// pair and the game-stage counter.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Tag<S: HasWeights> {
    psq: S::Pair,
    stage: u32,
}

impl<S: HasWeights> Tag<S> {
    /// Computes the tag of a board from scratch.
    pub fn from_board(b: &Board) -> Tag<S> {
        let w = S::weights();
        let mut psq = S::Pair::default();
        let mut stage = 0u32;
        for idx in 0..64u8 {
            let cell = b.cell_at(SQ(idx));
            if cell.is_occupied() {
                psq += w.psq(cell, SQ(idx)).clone();
            }
            stage += STAGES[cell as usize];
        }
        Tag { psq, stage }
    }

    /// Returns the tag of the position after `mov` is applied to `b`. Must
    /// be called before the move is made; the update is O(1).
    pub fn updated(&self, b: &Board, mov: Move) -> Tag<S> {
        let w = S::weights();
        let mut result = self.clone();
        if mov.kind == MoveKind::Null {
            return result;
        }
        let color = b.side();
        if mov.kind == MoveKind::CastlingKingside {
            result.psq += w.psq_kingside_upd[color as usize].clone();
            return result;
        }
        if mov.kind == MoveKind::CastlingQueenside {
            result.psq += w.psq_queenside_upd[color as usize].clone();
            return result;
        }
        let src_cell = b.cell_at(mov.src);
        let dst_cell = b.cell_at(mov.dst);
        result.psq -= w.psq(src_cell, mov.src).clone();
        if dst_cell.is_occupied() {
            result.psq -= w.psq(dst_cell, mov.dst).clone();
        }
        result.stage -= STAGES[dst_cell as usize];
        if mov.kind.is_promote() {
            let promote_cell = Cell::make(color, mov.kind.promote_piece());
            result.psq += w.psq(promote_cell, mov.dst).clone();
            result.stage += STAGES[promote_cell as usize];
            return result;
        }
        result.psq += w.psq(src_cell, mov.dst).clone();
        if mov.kind == MoveKind::Enpassant {
            let pawn_pos = enpassant_pawn_pos(color, mov.dst);
            let enemy_pawn = Cell::make(color.invert(), Piece::Pawn);
            result.psq -= w.psq(enemy_pawn, pawn_pos).clone();
        }
        result
    }

    /// Recomputes the tag and compares; a debug aid only.
    pub fn is_valid(&self, b: &Board) -> bool {
        *self == Tag::from_board(b)
    }

    /// Game stage as a coefficient in `0..=COEF_UNIT` (`COEF_UNIT` is the
    /// full middlegame).
    fn stage_coef(&self) -> u32 {
        let raw = ((self.stage << COEF_UNIT_SHIFT) + (STAGE_TOTAL >> 1)) / STAGE_TOTAL;
        raw.min(COEF_UNIT)
    }
}

/// The evaluator. Owns a private pawn cache; create one per search thread.
pub struct Evaluator<S: HasWeights = Value> {
    pawn_cache: PawnCache<S>,
}

/// The evaluator instantiation used for play.
pub type ScoreEvaluator = Evaluator<Value>;

impl<S: HasWeights> Evaluator<S> {
    pub fn new() -> Evaluator<S> {
        Evaluator {
            pawn_cache: PawnCache::new(),
        }
    }

    /// Evaluates the position from White's point of view.
    pub fn eval_for_white(&mut self, b: &Board, tag: &Tag<S>) -> S {
        let stage = tag.stage_coef();
        let mut result = tag.psq.mix(stage);

        let hash = pawn_hash(
            b.piece_bb(Color::White, Piece::Pawn).0,
            b.piece_bb(Color::Black, Piece::Pawn).0,
        );
        self.pawn_cache.prefetch(hash);

        result += eval_king_safety::<S>(b, Color::White, stage)
            - eval_king_safety::<S>(b, Color::Black, stage);
        result += eval_material::<S>(b, Color::White) - eval_material::<S>(b, Color::Black);

        let pawn_value = self.pawn_cache.get(hash, || eval_pawns::<S>(b));
        result += pawn_value.score.clone();
        result += eval_open_lines::<S>(b, Color::White, &pawn_value)
            - eval_open_lines::<S>(b, Color::Black, &pawn_value);
        result
    }

    /// Evaluates the position from the point of view of the side to move.
    pub fn eval_for_cur(&mut self, b: &Board, tag: &Tag<S>) -> S {
        let white = self.eval_for_white(b, tag);
        match b.side() {
            Color::White => white,
            Color::Black => -white,
        }
    }
}

impl<S: HasWeights> Default for Evaluator<S> {
    fn default() -> Self {
        Evaluator::new()
    }
}

fn eval_king_safety<S: HasWeights>(b: &Board, c: Color, stage: u32) -> S {
    let w = S::weights();
    let mut result = S::default();

    let king_bb = b.piece_bb(c, Piece::King);
    let king_pos = king_bb.bit_scan_forward();

    // Enemy heavy pieces near the king, weighted by ring distance.
    let near_count = |piece: Piece| -> i32 {
        let bb = b.piece_bb(c.invert(), piece).0;
        let mut count = 0u32;
        for dist in 1..4usize {
            count += KING_ZONE_COST[dist]
                * popcount64(EVAL_BB.king_ring[dist][king_pos.0 as usize] & bb) as u32;
        }
        count as i32
    };
    result += w.queen_near_king.clone().mul_coef(near_count(Piece::Queen));
    result += w.rook_near_king.clone().mul_coef(near_count(Piece::Rook));

    // Pawn shield and pawn storm, only for a king sitting in its corner.
    let shielded = match c {
        Color::White => BB_WHITE_SHIELDED_KING,
        Color::Black => BB_BLACK_SHIELDED_KING,
    };
    if king_bb.0 & shielded != 0 {
        let pawns = b.piece_bb(c, Piece::Pawn).0;
        let enemy_pawns = b.piece_bb(c.invert(), Piece::Pawn).0;
        let king_file = king_pos.file() as u64;

        let (row1, row2, row3, shift1, shift2, shift3) = match c {
            Color::White => (
                BB_ROW[6],
                BB_ROW[5],
                BB_ROW[4],
                king_file + 47,
                king_file + 39,
                king_file + 31,
            ),
            Color::Black => (
                BB_ROW[1],
                BB_ROW[2],
                BB_ROW[3],
                king_file + 7,
                king_file + 15,
                king_file + 23,
            ),
        };

        let shield1 = ((pawns & row1) >> shift1) & 7;
        let shield2 = ((pawns & row2) >> shift2) & 7;
        let storm2 = ((enemy_pawns & row2) >> shift2) & 7;
        let storm3 = ((enemy_pawns & row3) >> shift3) & 7;

        let inverted = king_file > 4;
        let (shield_tab, storm_tab) = if inverted {
            (&w.king_shield_inv, &w.king_storm_inv)
        } else {
            (&w.king_shield, &w.king_storm)
        };
        let pair = shield_tab[(shield1 * 8 + shield2) as usize].clone()
            + storm_tab[(storm2 * 8 + storm3) as usize].clone();
        result += pair.mix(stage);
    }

    result
}

fn eval_material<S: HasWeights>(b: &Board, c: Color) -> S {
    let w = S::weights();
    let mut result = S::default();
    if b.piece_bb(c, Piece::Bishop).count_bits() >= 2 {
        result += w.two_bishops.clone();
    }
    result
}

fn eval_pawns<S: HasWeights>(b: &Board) -> PawnCacheValue<S> {
    let w = S::weights();
    let bb_white = b.piece_bb(Color::White, Piece::Pawn).0;
    let bb_black = b.piece_bb(Color::Black, Piece::Pawn).0;
    let bb_all_pawns = bb_white | bb_black;
    let white_attacks = advance_pawn_left(Color::White, bb_white)
        | advance_pawn_right(Color::White, bb_white);
    let black_attacks = advance_pawn_left(Color::Black, bb_black)
        | advance_pawn_right(Color::Black, bb_black);

    let eval_side = |c: Color| -> S {
        let mut result = S::default();
        let (pawns, enemy_pawns, attacks, enemy_attacks) = match c {
            Color::White => (bb_white, bb_black, white_attacks, black_attacks),
            Color::Black => (bb_black, bb_white, black_attacks, white_attacks),
        };

        let open_masks = &EVAL_BB.open_pawn[c as usize];
        let passed_masks = &EVAL_BB.passed_pawn[c as usize];
        let frontspan_masks = &EVAL_BB.attack_frontspans[c as usize];

        let mut isolated = 0i32;
        let mut double = 0i32;
        let mut passed = 0i32;
        let mut open = 0i32;
        let mut candidate = 0i32;
        let mut attack_frontspans = 0u64;

        let mut iter = pawns;
        while iter != 0 {
            let src = iter.trailing_zeros() as usize;
            iter &= iter - 1;
            if pawns & EVAL_BB.isolated_pawn[src] == 0 {
                isolated += 1;
            }
            if pawns & EVAL_BB.double_pawn[src] != 0 {
                double += 1;
            }
            if bb_all_pawns & open_masks[src] == 0 {
                open += 1;
                if enemy_pawns & passed_masks[src] == 0 {
                    passed += 1;
                } else if enemy_attacks & !attacks & open_masks[src] == 0 {
                    candidate += 1;
                }
            }
            attack_frontspans |= frontspan_masks[src];
        }
        open -= passed;
        open -= candidate;

        let protected = popcount64(pawns & attacks) as i32;
        let backward =
            popcount64(advance_pawn_forward(c, pawns) & enemy_attacks & !attack_frontspans) as i32;

        result += w.pawn_isolated.clone().mul_coef(isolated);
        result += w.pawn_double.clone().mul_coef(double);
        result += w.pawn_passed.clone().mul_coef(passed);
        result += w.pawn_open.clone().mul_coef(open);
        result += w.pawn_candidate.clone().mul_coef(candidate);
        result += w.pawn_protected.clone().mul_coef(protected);
        result += w.pawn_backward.clone().mul_coef(backward);
        result
    };

    let score = eval_side(Color::White) - eval_side(Color::Black);
    let white_cols = byte_gather(bb_white);
    let black_cols = byte_gather(bb_black);
    PawnCacheValue::from_parts(
        !white_cols & !black_cols,
        white_cols & !black_cols,
        !white_cols & black_cols,
        score,
    )
}

fn eval_open_lines<S: HasWeights>(b: &Board, c: Color, pawn_value: &PawnCacheValue<S>) -> S {
    let w = S::weights();
    let mut result = S::default();
    let open_cols = byte_scatter(pawn_value.bb_open_cols);
    let semi_open_cols = byte_scatter(match c {
        Color::White => pawn_value.bb_black_only_cols,
        Color::Black => pawn_value.bb_white_only_cols,
    });
    let rooks = b.piece_bb(c, Piece::Rook).0;
    let queens = b.piece_bb(c, Piece::Queen).0;
    result += w
        .rook_open_col
        .clone()
        .mul_coef(popcount64(open_cols & rooks) as i32);
    result += w
        .rook_semi_open_col
        .clone()
        .mul_coef(popcount64(semi_open_cols & rooks) as i32);
    result += w
        .queen_open_col
        .clone()
        .mul_coef(popcount64(open_cols & queens) as i32);
    result += w
        .queen_semi_open_col
        .clone()
        .mul_coef(popcount64(semi_open_cols & queens) as i32);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{move_make, move_unmake};
    use crate::board::movegen::{is_move_legal, MoveGen};
    use crate::core::move_list::MoveList;

    #[test]
    fn start_position_is_balanced() {
        crate::init();
        let b = Board::initial();
        let tag: Tag<Value> = Tag::from_board(&b);
        let mut eval: ScoreEvaluator = Evaluator::new();
        assert_eq!(eval.eval_for_white(&b, &tag), 0);
        assert_eq!(eval.eval_for_cur(&b, &tag), 0);
    }

    #[test]
    fn tag_updates_match_recompute_along_random_games() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        crate::init();
        let mut rng = StdRng::seed_from_u64(0xc0ffee);
        for _ in 0..12 {
            let mut b = Board::initial();
            let mut tag: Tag<Value> = Tag::from_board(&b);
            for _ in 0..60 {
                let mut list = MoveList::new();
                MoveGen::new(&b).gen_all(&mut list);
                let legal: Vec<_> = list
                    .iter()
                    .cloned()
                    .filter(|&m| is_move_legal(&b, m))
                    .collect();
                if legal.is_empty() {
                    break;
                }
                let mov = legal[rng.gen_range(0..legal.len())];
                let next = tag.updated(&b, mov);
                move_make(&mut b, mov);
                assert!(next.is_valid(&b), "tag diverged after {}", mov);
                tag = next;
            }
        }
    }

    #[test]
    fn tag_update_handles_special_moves() {
        crate::init();
        // Position with castling, en passant and promotion all available.
        let b = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
        let tag: Tag<Value> = Tag::from_board(&b);
        let mut list = MoveList::new();
        MoveGen::new(&b).gen_all(&mut list);
        for &m in list.iter() {
            if !is_move_legal(&b, m) {
                continue;
            }
            let mut child = b.clone();
            let next = tag.updated(&child, m);
            move_make(&mut child, m);
            assert!(next.is_valid(&child), "tag diverged after {:?}", m);
        }
    }

    #[test]
    fn material_up_is_positive() {
        crate::init();
        // White is a queen up.
        let b = Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let tag: Tag<Value> = Tag::from_board(&b);
        let mut eval: ScoreEvaluator = Evaluator::new();
        let score = eval.eval_for_white(&b, &tag);
        assert!(score > 500, "queen-up score was {}", score);
        // And from Black's point of view it's negative.
        assert_eq!(eval.eval_for_cur(&b, &tag), score);
        let mut b2 = b.clone();
        let mut list = MoveList::new();
        MoveGen::new(&b2).gen_all(&mut list);
        let mov = *list.iter().find(|&&m| is_move_legal(&b2, m)).unwrap();
        let tag2 = tag.updated(&b2, mov);
        let p = move_make(&mut b2, mov);
        let cur = eval.eval_for_cur(&b2, &tag2);
        assert!(cur < 0, "Black to move should see a bad position");
        move_unmake(&mut b2, mov, p);
    }

    #[test]
    fn coefficient_vector_counts_two_bishops() {
        crate::init();
        let b = Board::initial();
        let tag: Tag<CoefVector> = Tag::from_board(&b);
        let mut eval: Evaluator<CoefVector> = Evaluator::new();
        let vec = eval.eval_for_white(&b, &tag);
        // Both sides have two bishops, so the feature cancels.
        assert_eq!(vec.coef(weights::FEAT_TWO_BISHOPS), 0);
        // Drop a black bishop: the feature fires once for White.
        let b = Board::from_fen("rn1qkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let tag: Tag<CoefVector> = Tag::from_board(&b);
        let vec = eval.eval_for_white(&b, &tag);
        assert_eq!(vec.coef(weights::FEAT_TWO_BISHOPS), 1);
    }
}
