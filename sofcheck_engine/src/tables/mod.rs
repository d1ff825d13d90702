//! Small per-thread tables supporting move ordering and repetition
//! detection: killer lines, the history table and the repetition table.

use sofcheck::Move;

use std::ops::{Index, IndexMut};

/// Line of "killer" moves: the two most recent quiet moves that caused a
/// beta cutoff at a given ply. Admitting a move distinct from the first
/// killer pushes the first into the second slot.
#[derive(Copy, Clone)]
pub struct KillerLine {
    first: Move,
    second: Move,
}

impl KillerLine {
    pub fn new() -> KillerLine {
        KillerLine {
            first: Move::null(),
            second: Move::null(),
        }
    }

    /// The most recent killer.
    #[inline(always)]
    pub fn first(&self) -> Move {
        self.first
    }

    /// The previous killer.
    #[inline(always)]
    pub fn second(&self) -> Move {
        self.second
    }

    /// Adds a killer move to the line.
    #[inline]
    pub fn add(&mut self, mov: Move) {
        if mov == self.first {
            return;
        }
        self.second = self.first;
        self.first = mov;
    }
}

impl Default for KillerLine {
    fn default() -> Self {
        KillerLine::new()
    }
}

const HISTORY_SIZE: usize = 64 * 64;

/// History heuristic counters, indexed by the source and destination squares
/// of a quiet move.
pub struct HistoryTable {
    tab: Box<[u64; HISTORY_SIZE]>,
}

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable {
            tab: Box::new([0; HISTORY_SIZE]),
        }
    }

    #[inline(always)]
    fn index_of(mov: Move) -> usize {
        ((mov.src.0 as usize) << 6) | (mov.dst.0 as usize)
    }
}

impl Index<Move> for HistoryTable {
    type Output = u64;

    #[inline(always)]
    fn index(&self, mov: Move) -> &u64 {
        &self.tab[HistoryTable::index_of(mov)]
    }
}

impl IndexMut<Move> for HistoryTable {
    #[inline(always)]
    fn index_mut(&mut self, mov: Move) -> &mut u64 {
        &mut self.tab[HistoryTable::index_of(mov)]
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        HistoryTable::new()
    }
}

const INITIAL_BUCKET_COUNT: usize = 32;
const BUCKET_SIZE: usize = 4;

/// Small open-addressed hash set of board hashes on the current search path,
/// used to detect draws by repetition. A bucket holds four slots; the table
/// doubles when an insert finds its bucket full.
pub struct RepetitionTable {
    tab: Vec<u64>,
    bucket_count: usize,
    // Equal to `(bucket_count - 1) * BUCKET_SIZE`, so that `hash & mask` is
    // a bucket-aligned index.
    mask: usize,
}

impl RepetitionTable {
    pub fn new() -> RepetitionTable {
        RepetitionTable {
            tab: vec![0; INITIAL_BUCKET_COUNT * BUCKET_SIZE],
            bucket_count: INITIAL_BUCKET_COUNT,
            mask: (INITIAL_BUCKET_COUNT - 1) * BUCKET_SIZE,
        }
    }

    /// Returns `true` if `hash` is present.
    #[inline]
    pub fn has(&self, hash: u64) -> bool {
        let idx = (hash as usize) & self.mask;
        self.tab[idx..idx + BUCKET_SIZE].contains(&hash)
    }

    /// Inserts `hash`. Returns `false` if it was already present, which on
    /// the search path signals a repetition.
    pub fn insert(&mut self, hash: u64) -> bool {
        if self.has(hash) {
            return false;
        }
        loop {
            let idx = (hash as usize) & self.mask;
            for slot in self.tab[idx..idx + BUCKET_SIZE].iter_mut() {
                if *slot == 0 {
                    *slot = hash;
                    return true;
                }
            }
            self.grow();
        }
    }

    /// Removes `hash`. Removing a hash that is not present does nothing.
    pub fn erase(&mut self, hash: u64) {
        let idx = (hash as usize) & self.mask;
        for slot in self.tab[idx..idx + BUCKET_SIZE].iter_mut() {
            if *slot == hash {
                *slot = 0;
                return;
            }
        }
    }

    fn grow(&mut self) {
        let old = std::mem::replace(
            &mut self.tab,
            vec![0; self.bucket_count * 2 * BUCKET_SIZE],
        );
        self.bucket_count *= 2;
        self.mask = (self.bucket_count - 1) * BUCKET_SIZE;
        for hash in old.into_iter().filter(|&h| h != 0) {
            let idx = (hash as usize) & self.mask;
            for slot in self.tab[idx..idx + BUCKET_SIZE].iter_mut() {
                if *slot == 0 {
                    *slot = hash;
                    break;
                }
            }
        }
    }
}

impl Default for RepetitionTable {
    fn default() -> Self {
        RepetitionTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sofcheck::core::piece_move::MoveKind;
    use sofcheck::SQ;

    #[test]
    fn killers_rotate() {
        let m1 = Move::new(MoveKind::Simple, SQ(1), SQ(2));
        let m2 = Move::new(MoveKind::Simple, SQ(3), SQ(4));
        let mut line = KillerLine::new();
        line.add(m1);
        assert_eq!(line.first(), m1);
        line.add(m1);
        assert_eq!(line.second(), Move::null());
        line.add(m2);
        assert_eq!(line.first(), m2);
        assert_eq!(line.second(), m1);
    }

    #[test]
    fn history_counts() {
        let mut tab = HistoryTable::new();
        let m = Move::new(MoveKind::Simple, SQ(10), SQ(20));
        tab[m] += 9;
        tab[m] += 16;
        assert_eq!(tab[m], 25);
        let other = Move::new(MoveKind::Simple, SQ(20), SQ(10));
        assert_eq!(tab[other], 0);
    }

    #[test]
    fn repetition_insert_erase() {
        let mut tab = RepetitionTable::new();
        assert!(tab.insert(0xabc));
        assert!(!tab.insert(0xabc));
        assert!(tab.has(0xabc));
        tab.erase(0xabc);
        assert!(!tab.has(0xabc));
        assert!(tab.insert(0xabc));
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut tab = RepetitionTable::new();
        // Far more hashes than the initial table holds force growth.
        let hash = |i: u64| i.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1;
        for i in 1..=1000u64 {
            assert!(tab.insert(hash(i)), "insert {} failed", i);
        }
        for i in 1..=1000u64 {
            assert!(tab.has(hash(i)), "hash {} lost after growth", i);
        }
        assert!(!tab.insert(hash(500)));
    }
}
