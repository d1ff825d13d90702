//! Cache for the pawn-structure evaluation.
//!
//! Pawn structures repeat across huge numbers of positions, so their
//! evaluation is keyed by a hash of the two pawn bitboards and kept in a
//! direct-mapped table. Each search thread owns a private cache; there is no
//! synchronization.
//!
//! Only the integer score specialization actually caches. The tuning
//! instantiation recomputes every time, since coefficient vectors are not
//! worth storing.

use super::coefs::EvalScore;
use crate::tools::prefetch_read;

/// Number of cache entries. Must be a power of two; with 48 bits of the hash
/// spread across the value, anything from `2^16` up uses the whole key.
const CACHE_SIZE: usize = 1 << 18;

/// Value stored in the pawn cache: the pawn-structure score plus the three
/// file byte-masks the open-lines evaluation needs. Eight bytes for the
/// integer specialization.
#[derive(Clone, Default)]
#[repr(C)]
pub struct PawnCacheValue<S> {
    /// Files with no pawns at all.
    pub bb_open_cols: u8,
    /// Files with only white pawns.
    pub bb_white_only_cols: u8,
    /// Files with only black pawns.
    pub bb_black_only_cols: u8,
    flags: u8,
    unused: u16,
    /// The pawn-structure score, from White's point of view.
    pub score: S,
}

const FLAG_IS_VALID: u8 = 1;

impl<S: EvalScore> PawnCacheValue<S> {
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.flags & FLAG_IS_VALID != 0
    }

    /// Creates a valid cache value.
    pub fn from_parts(
        bb_open_cols: u8,
        bb_white_only_cols: u8,
        bb_black_only_cols: u8,
        score: S,
    ) -> PawnCacheValue<S> {
        PawnCacheValue {
            bb_open_cols,
            bb_white_only_cols,
            bb_black_only_cols,
            flags: FLAG_IS_VALID,
            unused: 0,
            score,
        }
    }

    fn invalid() -> PawnCacheValue<S> {
        PawnCacheValue::default()
    }
}

#[derive(Clone)]
struct Entry<S> {
    hash: u64,
    value: PawnCacheValue<S>,
}

/// Direct-mapped pawn evaluation cache.
pub struct PawnCache<S: EvalScore> {
    entries: Option<Box<[Entry<S>]>>,
}

impl<S: EvalScore> PawnCache<S> {
    pub fn new() -> PawnCache<S> {
        let entries = if S::USES_PAWN_CACHE {
            Some(
                vec![
                    Entry {
                        hash: 0,
                        value: PawnCacheValue::invalid(),
                    };
                    CACHE_SIZE
                ]
                .into_boxed_slice(),
            )
        } else {
            None
        };
        PawnCache { entries }
    }

    /// Hints the CPU to pull the slot of `pawn_hash` into cache.
    #[inline(always)]
    pub fn prefetch(&self, pawn_hash: u64) {
        if let Some(ref entries) = self.entries {
            prefetch_read(&entries[(pawn_hash as usize) & (CACHE_SIZE - 1)]);
        }
    }

    /// Returns the cached value for `pawn_hash`, or computes it with `func`
    /// and stores the result.
    pub fn get<F>(&mut self, pawn_hash: u64, func: F) -> PawnCacheValue<S>
    where
        F: FnOnce() -> PawnCacheValue<S>,
    {
        let entries = match self.entries {
            Some(ref mut entries) => entries,
            None => return func(),
        };
        let idx = (pawn_hash as usize) & (CACHE_SIZE - 1);
        {
            let entry = &entries[idx];
            if entry.hash == pawn_hash && entry.value.is_valid() {
                return entry.value.clone();
            }
        }
        let value = func();
        entries[idx] = Entry {
            hash: pawn_hash,
            value: value.clone(),
        };
        value
    }
}

impl<S: EvalScore> Default for PawnCache<S> {
    fn default() -> Self {
        PawnCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::score::Value;
    use crate::eval::coefs::CoefVector;
    use std::mem;

    #[test]
    fn integer_value_is_eight_bytes() {
        assert_eq!(mem::size_of::<PawnCacheValue<Value>>(), 8);
    }

    #[test]
    fn caches_integer_scores() {
        let mut cache: PawnCache<Value> = PawnCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache.get(0x1234_5678_9abc, || {
                calls += 1;
                PawnCacheValue::from_parts(0xf0, 0x0c, 0x03, 57)
            });
            assert_eq!(v.score, 57);
            assert_eq!(v.bb_open_cols, 0xf0);
        }
        assert_eq!(calls, 1, "the second and third lookups must hit");
        // A different structure landing in another slot computes again.
        cache.get(0x9999_0000_1111, || {
            calls += 1;
            PawnCacheValue::from_parts(0, 0, 0, -3)
        });
        assert_eq!(calls, 2);
    }

    #[test]
    fn pass_through_for_vectors() {
        let mut cache: PawnCache<CoefVector> = PawnCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            cache.get(42, || {
                calls += 1;
                PawnCacheValue::from_parts(0, 0, 0, CoefVector::default())
            });
        }
        assert_eq!(calls, 3, "vector caches must recompute every time");
    }
}
