//! Primitives for position scores.
//!
//! A [`Value`] is a single `i16` score in centipawn-like units, measured from
//! the point of view of the side to move. The encoding reserves the extremes
//! for forced mates:
//!
//! * `-SCORE_CHECKMATE <= v <= -SCORE_CHECKMATE_THRESHOLD`: the current side
//!   is getting checkmated, with the distance in plies encoded in the offset
//!   from `-SCORE_CHECKMATE`.
//! * `-SCORE_CHECKMATE_THRESHOLD < v < SCORE_CHECKMATE_THRESHOLD`: a normal
//!   evaluation.
//! * `SCORE_CHECKMATE_THRESHOLD <= v <= SCORE_CHECKMATE`: the current side
//!   delivers checkmate.
//!
//! A [`ScorePair`] packs a midgame and an endgame score into one 32-bit word
//! so that the incremental piece-square updates touch both halves with a
//! single add.
//!
//! [`Value`]: type.Value.html
//! [`ScorePair`]: struct.ScorePair.html

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Type for determining the value of an evaluation.
pub type Value = i16;

/// Infinite score, used as the initial alpha-beta window. `-SCORE_INF` must
/// also fit in a `Value`.
pub const SCORE_INF: Value = 32767;

/// Score assigned to delivering checkmate right now.
pub const SCORE_CHECKMATE: Value = 30000;

/// Threshold score to indicate checkmate. If `score.abs() >=
/// SCORE_CHECKMATE_THRESHOLD`, then a forced mate was found.
pub const SCORE_CHECKMATE_THRESHOLD: Value = 28000;

/// Score of the current side being checkmated in `plies` plies.
#[inline(always)]
pub const fn score_checkmate_lose(plies: i16) -> Value {
    plies - SCORE_CHECKMATE
}

/// Score of the current side giving checkmate in `plies` plies.
#[inline(always)]
pub const fn score_checkmate_win(plies: i16) -> Value {
    SCORE_CHECKMATE - plies
}

/// Returns `true` if the score indicates a forced mate for either side.
#[inline(always)]
pub const fn is_score_checkmate(score: Value) -> bool {
    score <= -SCORE_CHECKMATE_THRESHOLD || score >= SCORE_CHECKMATE_THRESHOLD
}

/// Returns `true` if `score` is a value the search may produce. Mate scores
/// must keep the parity of their ply distance.
pub const fn is_score_valid(score: Value) -> bool {
    if score > SCORE_CHECKMATE || score < -SCORE_CHECKMATE {
        return false;
    }
    if score <= -SCORE_CHECKMATE_THRESHOLD {
        return (score + SCORE_CHECKMATE) % 2 == 0;
    }
    if score >= SCORE_CHECKMATE_THRESHOLD {
        return (SCORE_CHECKMATE - score) % 2 != 0;
    }
    true
}

/// Shifts a mate score by `delta` plies; non-mate scores pass through
/// unchanged. Used to convert mate distances between path-relative and
/// position-relative forms when storing to and loading from the
/// transposition table.
#[inline]
pub const fn adjust_checkmate(score: Value, delta: i16) -> Value {
    if score >= SCORE_CHECKMATE_THRESHOLD {
        score - delta
    } else if score > -SCORE_CHECKMATE_THRESHOLD {
        score
    } else {
        score + delta
    }
}

/// Pair of score values, used to update the middlegame score and the endgame
/// score at the same time.
///
/// The first (midgame) component lives in the low half of the word and the
/// second in the high half; extraction of the second component corrects for
/// the borrow a negative first component produces.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct ScorePair(i32);

impl ScorePair {
    pub const ZERO: ScorePair = ScorePair(0);

    /// Creates a score pair from two scores.
    #[inline(always)]
    pub const fn from(first: Value, second: Value) -> ScorePair {
        ScorePair((second as i32).wrapping_mul(0x10000).wrapping_add(first as i32))
    }

    /// Creates a score pair from two equal scores.
    #[inline(always)]
    pub const fn from_both(score: Value) -> ScorePair {
        ScorePair::from(score, score)
    }

    /// Extracts the first (midgame) item of the score pair.
    #[inline(always)]
    pub const fn first(self) -> Value {
        (self.0 as u32 & 0xffff) as u16 as i16
    }

    /// Extracts the second (endgame) item of the score pair.
    #[inline(always)]
    pub const fn second(self) -> Value {
        let mut unsigned = (self.0 as u32 >> 16) as u16;
        if self.first() < 0 {
            unsigned = unsigned.wrapping_add(1);
        }
        unsigned as i16
    }
}

impl Add for ScorePair {
    type Output = ScorePair;

    #[inline(always)]
    fn add(self, rhs: ScorePair) -> ScorePair {
        ScorePair(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for ScorePair {
    type Output = ScorePair;

    #[inline(always)]
    fn sub(self, rhs: ScorePair) -> ScorePair {
        ScorePair(self.0.wrapping_sub(rhs.0))
    }
}

impl AddAssign for ScorePair {
    #[inline(always)]
    fn add_assign(&mut self, rhs: ScorePair) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl SubAssign for ScorePair {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: ScorePair) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for ScorePair {
    type Output = ScorePair;

    #[inline(always)]
    fn neg(self) -> ScorePair {
        ScorePair(self.0.wrapping_neg())
    }
}

impl Mul<i32> for ScorePair {
    type Output = ScorePair;

    #[inline(always)]
    fn mul(self, rhs: i32) -> ScorePair {
        ScorePair(self.0.wrapping_mul(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack() {
        let samples: [(Value, Value); 9] = [
            (1000, 8000),
            (1000, -8000),
            (-1000, 8000),
            (-1000, -8000),
            (-1000, 0),
            (1000, 0),
            (0, -1000),
            (0, 1000),
            (0, 0),
        ];
        for &(a, b) in samples.iter() {
            let pair = ScorePair::from(a, b);
            assert_eq!(pair.first(), a, "first of ({}, {})", a, b);
            assert_eq!(pair.second(), b, "second of ({}, {})", a, b);
        }
    }

    #[test]
    fn arithmetic_distributes() {
        let samples: [(Value, Value); 4] = [(-1, 5), (3, -8), (120, 7), (-90, -41)];
        for &(a1, b1) in samples.iter() {
            for &(a2, b2) in samples.iter() {
                let p1 = ScorePair::from(a1, b1);
                let p2 = ScorePair::from(a2, b2);
                assert_eq!(p1 + p2, ScorePair::from(a1 + a2, b1 + b2));
                assert_eq!(p1 - p2, ScorePair::from(a1 - a2, b1 - b2));
            }
            assert_eq!(-ScorePair::from(a1, b1), ScorePair::from(-a1, -b1));
            assert_eq!(
                ScorePair::from(a1, b1) * 3,
                ScorePair::from(a1 * 3, b1 * 3)
            );
        }
    }

    #[test]
    fn checkmate_scores() {
        assert!(is_score_checkmate(score_checkmate_win(3)));
        assert!(is_score_checkmate(score_checkmate_lose(4)));
        assert!(!is_score_checkmate(0));
        assert!(is_score_valid(score_checkmate_win(5)));
        assert!(is_score_valid(score_checkmate_lose(6)));
        assert!(!is_score_valid(score_checkmate_win(4)));
        assert_eq!(
            adjust_checkmate(score_checkmate_win(5), -2),
            score_checkmate_win(3)
        );
        assert_eq!(adjust_checkmate(100, 7), 100);
    }
}
