//! The score abstraction the evaluator is generic over.
//!
//! The same evaluation code runs with two score types: the 16-bit integer
//! [`Value`] used for play, and the sparse [`CoefVector`] used by the
//! offline weight-tuning pipeline, which records how many times each weight
//! feature fires instead of summing weight values.
//!
//! [`Value`]: ../../core/score/type.Value.html
//! [`CoefVector`]: struct.CoefVector.html

use crate::core::score::{ScorePair, Value};

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Fixed-point unit of the game stage: `mix` interpolates between the
/// midgame and endgame scores with `stage / COEF_UNIT`.
pub const COEF_UNIT: u32 = 256;
pub const COEF_UNIT_SHIFT: u32 = 8;

/// A score type the evaluator can produce.
pub trait EvalScore:
    Clone
    + Default
    + PartialEq
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Send
    + Sized
    + 'static
{
    /// The paired (midgame, endgame) form of the score.
    type Pair: EvalPair<Self>;

    /// Whether the pawn cache stores scores of this type. Only the integer
    /// specialization caches; coefficient vectors pass through.
    const USES_PAWN_CACHE: bool;

    /// The score of weight feature `feature` occurring once.
    fn weight(feature: usize) -> Self;

    /// Multiplies the score by an occurrence count.
    fn mul_coef(self, coef: i32) -> Self;
}

/// Pair arithmetic over a score type.
pub trait EvalPair<S>:
    Clone
    + Default
    + PartialEq
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Send
    + Sized
    + 'static
{
    /// Builds a pair from its midgame and endgame parts.
    fn from_parts(mid: S, end: S) -> Self;

    /// Interpolates the pair at game stage `stage` (in `0..=COEF_UNIT`).
    fn mix(&self, stage: u32) -> S;
}

impl EvalScore for Value {
    type Pair = ScorePair;

    const USES_PAWN_CACHE: bool = true;

    #[inline(always)]
    fn weight(feature: usize) -> Value {
        super::weights::WEIGHT_VALUES[feature]
    }

    #[inline(always)]
    fn mul_coef(self, coef: i32) -> Value {
        (self as i32 * coef) as Value
    }
}

impl EvalPair<Value> for ScorePair {
    #[inline(always)]
    fn from_parts(mid: Value, end: Value) -> ScorePair {
        ScorePair::from(mid, end)
    }

    #[inline(always)]
    fn mix(&self, stage: u32) -> Value {
        let mid = self.first() as i32;
        let end = self.second() as i32;
        ((mid * stage as i32 + end * (COEF_UNIT - stage) as i32) >> COEF_UNIT_SHIFT) as Value
    }
}

/// A sparse vector of weight-feature coefficients: entry `(feature, count)`
/// says that the feature's weight fires `count` times in the evaluated
/// position. Kept sorted by feature index.
///
/// After [`mix`] the counts are in fixed-point `1/COEF_UNIT` units, since
/// stage interpolation does not divide back down.
///
/// [`mix`]: trait.EvalPair.html#tymethod.mix
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct CoefVector {
    items: Vec<(usize, i32)>,
}

impl CoefVector {
    /// The vector with a single feature firing once.
    pub fn unit(feature: usize) -> CoefVector {
        CoefVector {
            items: vec![(feature, 1)],
        }
    }

    /// The coefficient of one feature.
    pub fn coef(&self, feature: usize) -> i32 {
        match self.items.binary_search_by_key(&feature, |it| it.0) {
            Ok(pos) => self.items[pos].1,
            Err(_) => 0,
        }
    }

    /// Iterates over the non-zero coefficients.
    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.items.iter().copied()
    }

    fn merge(&mut self, other: &CoefVector, sign: i32) {
        for &(feature, coef) in other.items.iter() {
            match self.items.binary_search_by_key(&feature, |it| it.0) {
                Ok(pos) => {
                    self.items[pos].1 += sign * coef;
                    if self.items[pos].1 == 0 {
                        self.items.remove(pos);
                    }
                }
                Err(pos) => {
                    self.items.insert(pos, (feature, sign * coef));
                }
            }
        }
    }
}

impl Add for CoefVector {
    type Output = CoefVector;

    fn add(mut self, rhs: CoefVector) -> CoefVector {
        self.merge(&rhs, 1);
        self
    }
}

impl Sub for CoefVector {
    type Output = CoefVector;

    fn sub(mut self, rhs: CoefVector) -> CoefVector {
        self.merge(&rhs, -1);
        self
    }
}

impl AddAssign for CoefVector {
    fn add_assign(&mut self, rhs: CoefVector) {
        self.merge(&rhs, 1);
    }
}

impl SubAssign for CoefVector {
    fn sub_assign(&mut self, rhs: CoefVector) {
        self.merge(&rhs, -1);
    }
}

impl Neg for CoefVector {
    type Output = CoefVector;

    fn neg(mut self) -> CoefVector {
        for item in self.items.iter_mut() {
            item.1 = -item.1;
        }
        self
    }
}

impl EvalScore for CoefVector {
    type Pair = CoefPair;

    const USES_PAWN_CACHE: bool = false;

    fn weight(feature: usize) -> CoefVector {
        CoefVector::unit(feature)
    }

    fn mul_coef(mut self, coef: i32) -> CoefVector {
        if coef == 0 {
            return CoefVector::default();
        }
        for item in self.items.iter_mut() {
            item.1 *= coef;
        }
        self
    }
}

/// Midgame/endgame pair of coefficient vectors.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct CoefPair {
    pub mid: CoefVector,
    pub end: CoefVector,
}

impl Add for CoefPair {
    type Output = CoefPair;

    fn add(self, rhs: CoefPair) -> CoefPair {
        CoefPair {
            mid: self.mid + rhs.mid,
            end: self.end + rhs.end,
        }
    }
}

impl Sub for CoefPair {
    type Output = CoefPair;

    fn sub(self, rhs: CoefPair) -> CoefPair {
        CoefPair {
            mid: self.mid - rhs.mid,
            end: self.end - rhs.end,
        }
    }
}

impl AddAssign for CoefPair {
    fn add_assign(&mut self, rhs: CoefPair) {
        self.mid += rhs.mid;
        self.end += rhs.end;
    }
}

impl SubAssign for CoefPair {
    fn sub_assign(&mut self, rhs: CoefPair) {
        self.mid -= rhs.mid;
        self.end -= rhs.end;
    }
}

impl Neg for CoefPair {
    type Output = CoefPair;

    fn neg(self) -> CoefPair {
        CoefPair {
            mid: -self.mid,
            end: -self.end,
        }
    }
}

impl EvalPair<CoefVector> for CoefPair {
    fn from_parts(mid: CoefVector, end: CoefVector) -> CoefPair {
        CoefPair { mid, end }
    }

    fn mix(&self, stage: u32) -> CoefVector {
        self.mid.clone().mul_coef(stage as i32)
            + self.end.clone().mul_coef((COEF_UNIT - stage) as i32)
    }
}
