//! The transposition table: a lock-free hash table mapping Zobrist keys to
//! search results.
//!
//! Each slot is two relaxed-atomic 64-bit words holding
//! `(key ^ packed_value, packed_value)`. A reader XORs the two words to
//! recover the candidate key; a torn read (another thread replaced one word
//! between the two loads) shows up as a key mismatch and is treated as a
//! miss. Writes are not synchronized at all; the last writer wins per slot
//! and the XOR check rejects any mix of two writes. Do not substitute a
//! locked map here: the lock-free access is the reason the table scales
//! across search threads.
//!
//! Entry replacement is weight-based: deeper, younger, exact, PV entries
//! with a move survive longer.

use crate::core::piece_move::Move;
use crate::core::score::Value;

use rayon::prelude::*;

use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a stored score relates to the true value of the position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    Exact = 0,
    Lowerbound = 1,
    Upperbound = 2,
}

impl Bound {
    #[inline]
    fn from_bits(bits: u8) -> Bound {
        match bits & 3 {
            0 => Bound::Exact,
            1 => Bound::Lowerbound,
            _ => Bound::Upperbound,
        }
    }
}

const FLAG_IS_VALID: u8 = 8;
const FLAG_IS_PV: u8 = 16;

/// A transposition table entry: the best move (with the search depth packed
/// into its tag byte), the score, the bound flags and the epoch the entry
/// was written in. Packs into one `u64`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Data {
    mov: Move,
    score: Value,
    flags: u8,
    epoch: u8,
}

impl Data {
    /// Creates an entry. `depth` is stored in the move's tag byte; the epoch
    /// is stamped by [`TranspositionTable::store`].
    ///
    /// [`TranspositionTable::store`]: struct.TranspositionTable.html#method.store
    pub fn new(mut mov: Move, score: Value, depth: i32, bound: Bound, is_pv: bool) -> Data {
        debug_assert!((0..256).contains(&depth));
        mov.tag = depth as u8;
        Data {
            mov,
            score,
            flags: bound as u8 | FLAG_IS_VALID | if is_pv { FLAG_IS_PV } else { 0 },
            epoch: 0,
        }
    }

    /// The sentinel "no data" entry.
    #[inline]
    pub fn zero() -> Data {
        Data {
            mov: Move::null(),
            score: 0,
            flags: 0,
            epoch: 0,
        }
    }

    /// The stored best move, with the depth tag stripped.
    #[inline]
    pub fn mov(&self) -> Move {
        self.mov.untagged()
    }

    /// The depth the entry was searched to.
    #[inline]
    pub fn depth(&self) -> i32 {
        self.mov.tag as i32
    }

    #[inline]
    pub fn score(&self) -> Value {
        self.score
    }

    #[inline]
    pub fn bound(&self) -> Bound {
        Bound::from_bits(self.flags)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.flags & FLAG_IS_VALID != 0
    }

    #[inline]
    pub fn is_pv(&self) -> bool {
        self.flags & FLAG_IS_PV != 0
    }

    /// Serializes the entry as a `u64`.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        (self.mov.as_u32() as u64)
            | ((self.score as u16 as u64) << 32)
            | ((self.flags as u64) << 48)
            | ((self.epoch as u64) << 56)
    }

    /// Rebuilds an entry from its packed form.
    #[inline]
    pub fn from_u64(data: u64) -> Data {
        Data {
            mov: Move::from_u32(data as u32),
            score: (data >> 32) as u16 as i16,
            flags: (data >> 48) as u8,
            epoch: (data >> 56) as u8,
        }
    }

    // Replacement weight of the entry when the table epoch is `cur_epoch`.
    // Entries with lower weight get overwritten by entries with greater
    // weight.
    fn weight(&self, cur_epoch: u8) -> i32 {
        if !self.is_valid() {
            return i32::min_value();
        }
        let age = cur_epoch.wrapping_sub(self.epoch) as i32;
        let mut result = 4 * self.depth() - age;
        if self.bound() == Bound::Exact {
            result += 6;
        }
        if self.mov() == Move::null() {
            result -= 4;
        }
        if self.is_pv() {
            result += 2;
        }
        result
    }
}

struct Entry {
    // `key` holds the real key XORed with the packed value.
    value: AtomicU64,
    key: AtomicU64,
}

impl Entry {
    fn new() -> Entry {
        Entry {
            value: AtomicU64::new(0),
            key: AtomicU64::new(0),
        }
    }

    #[inline]
    fn assign_relaxed(&self, value: u64, key: u64) {
        self.value.store(value, Ordering::Relaxed);
        self.key.store(key, Ordering::Relaxed);
    }
}

/// Default table size: 32 MiB.
pub const DEFAULT_TT_SIZE: usize = 32 * (1 << 20);

const MIN_TT_SIZE: usize = 1 << 20;

/// The shared transposition table. Probes and stores are safe from any
/// number of threads; `resize`, `clear` and the epoch operations are not
/// thread-safe and must run while no search is active.
pub struct TranspositionTable {
    table: Box<[Entry]>,
    epoch: u8,
}

fn alloc_entries(size: usize) -> Box<[Entry]> {
    iter::repeat_with(Entry::new).take(size).collect()
}

fn entry_count_for_bytes(max_size: usize) -> usize {
    let max_size = max_size.max(MIN_TT_SIZE);
    // The largest power of two not exceeding `max_size`, in entries.
    let mut bytes = 1usize;
    while bytes <= max_size / 2 {
        bytes <<= 1;
    }
    bytes / std::mem::size_of::<Entry>()
}

impl TranspositionTable {
    /// Creates a table of the default size.
    pub fn new() -> TranspositionTable {
        TranspositionTable::with_size(DEFAULT_TT_SIZE)
    }

    /// Creates a table of at most `max_size` bytes (rounded down to a power
    /// of two, at least 1 MiB).
    pub fn with_size(max_size: usize) -> TranspositionTable {
        TranspositionTable {
            table: alloc_entries(entry_count_for_bytes(max_size)),
            epoch: 0,
        }
    }

    /// The table size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.table.len() * std::mem::size_of::<Entry>()
    }

    #[inline(always)]
    fn slot(&self, key: u64) -> &Entry {
        let idx = (key as usize) & (self.table.len() - 1);
        unsafe { self.table.get_unchecked(idx) }
    }

    /// Hints the CPU to pull the slot of `key` into cache ahead of a probe.
    #[inline(always)]
    pub fn prefetch(&self, key: u64) {
        crate::tools::prefetch_read(self.slot(key));
    }

    /// Returns the entry stored for `key`, or the invalid sentinel when the
    /// slot holds another position or a torn write.
    pub fn probe(&self, key: u64) -> Data {
        let entry = self.slot(key);
        let value = entry.value.load(Ordering::Relaxed);
        let stored_key = entry.key.load(Ordering::Relaxed) ^ value;
        if stored_key != key {
            return Data::zero();
        }
        Data::from_u64(value)
    }

    /// Stores `data` for `key` if it outweighs the current occupant of the
    /// slot. The entry is stamped with the current epoch.
    pub fn store(&self, key: u64, mut data: Data) {
        data.epoch = self.epoch;
        let entry = self.slot(key);
        let old = Data::from_u64(entry.value.load(Ordering::Relaxed));
        if data.weight(self.epoch) >= old.weight(self.epoch) {
            let packed = data.as_u64();
            entry.assign_relaxed(packed, key ^ packed);
        }
    }

    /// Re-stamps an entry read from the table with the current epoch, if it
    /// is stale. Keeps hot PV entries from aging out.
    pub fn refresh(&self, key: u64, data: Data) {
        if data.epoch != self.epoch {
            self.store(key, data);
        }
    }

    /// Bumps the epoch. Call once per search.
    pub fn next_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Ages the table by `delta` epochs at once.
    pub fn grow_epoch(&mut self, delta: u8) {
        self.epoch = self.epoch.wrapping_add(delta);
    }

    /// Resets the epoch counter, forgetting all aging state.
    pub fn reset_epoch(&mut self) {
        self.epoch = 0;
    }

    /// Zero-fills the table using `jobs` worker threads.
    pub fn clear(&mut self, jobs: usize) {
        let pool = make_pool(jobs);
        let table = &self.table;
        pool.install(|| {
            table.par_iter().for_each(|entry| entry.assign_relaxed(0, 0));
        });
    }

    /// Resizes the table to at most `max_size` bytes using `jobs` worker
    /// threads. When `clear_table` is false the content is preserved where
    /// possible: growing rehashes every entry, shrinking keeps the
    /// higher-weight collider.
    pub fn resize(&mut self, max_size: usize, clear_table: bool, jobs: usize) {
        let new_size = entry_count_for_bytes(max_size);
        let old_size = self.table.len();
        if new_size == old_size {
            if clear_table {
                self.clear(jobs);
            }
            return;
        }

        let new_table = alloc_entries(new_size);
        let pool = make_pool(jobs);
        if !clear_table {
            let old_table = &self.table;
            let epoch = self.epoch;
            pool.install(|| {
                if new_size > old_size {
                    // Growing: spread the entries over the larger table.
                    old_table.par_iter().for_each(|entry| {
                        let value = entry.value.load(Ordering::Relaxed);
                        let key = entry.key.load(Ordering::Relaxed);
                        let idx = ((key ^ value) as usize) & (new_size - 1);
                        new_table[idx].assign_relaxed(value, key);
                    });
                } else {
                    // Shrinking: colliders fight it out by weight.
                    new_table.par_iter().enumerate().for_each(|(idx, slot)| {
                        let mut best = Data::zero();
                        let mut best_raw = (0u64, 0u64);
                        let mut stride = idx;
                        while stride < old_size {
                            let entry = &old_table[stride];
                            let value = entry.value.load(Ordering::Relaxed);
                            let key = entry.key.load(Ordering::Relaxed);
                            let data = Data::from_u64(value);
                            if data.weight(epoch) > best.weight(epoch) {
                                best = data;
                                best_raw = (value, key);
                            }
                            stride += new_size;
                        }
                        slot.assign_relaxed(best_raw.0, best_raw.1);
                    });
                }
            });
        }
        self.table = new_table;
    }

    /// An estimate of the table fill rate, in permille. Samples the first
    /// thousand entries the way UCI's `hashfull` expects.
    pub fn hash_full(&self) -> u32 {
        let sample = self.table.len().min(1000);
        let mut filled = 0;
        for entry in self.table.iter().take(sample) {
            if Data::from_u64(entry.value.load(Ordering::Relaxed)).is_valid() {
                filled += 1;
            }
        }
        (filled * 1000 / sample) as u32
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::new()
    }
}

fn make_pool(jobs: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .expect("failed to build thread pool")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece_move::MoveKind;
    use crate::core::sq::SQ;

    fn sample_move() -> Move {
        Move::new(MoveKind::Simple, SQ::E2, SQ::E4)
    }

    #[test]
    fn pack_round_trip() {
        let data = Data::new(sample_move(), -1234, 17, Bound::Lowerbound, true);
        let rebuilt = Data::from_u64(data.as_u64());
        assert_eq!(rebuilt, data);
        assert_eq!(rebuilt.mov(), sample_move());
        assert_eq!(rebuilt.depth(), 17);
        assert_eq!(rebuilt.score(), -1234);
        assert_eq!(rebuilt.bound(), Bound::Lowerbound);
        assert!(rebuilt.is_valid());
        assert!(rebuilt.is_pv());
    }

    #[test]
    fn store_then_probe() {
        let tt = TranspositionTable::with_size(MIN_TT_SIZE);
        let key = 0xfeed_beef_dead_c0de;
        let data = Data::new(sample_move(), 88, 9, Bound::Exact, false);
        tt.store(key, data);
        let got = tt.probe(key);
        assert!(got.is_valid());
        assert_eq!(got.mov(), sample_move());
        assert_eq!(got.score(), 88);
        assert_eq!(got.depth(), 9);
        // A different key mapping to the same slot misses.
        let collider = key.wrapping_add(tt.table.len() as u64);
        assert!(!tt.probe(collider).is_valid());
    }

    #[test]
    fn weaker_entries_do_not_replace() {
        let tt = TranspositionTable::with_size(MIN_TT_SIZE);
        let deep = Data::new(sample_move(), 10, 20, Bound::Exact, true);
        let shallow = Data::new(Move::null(), 5, 1, Bound::Upperbound, false);
        // Same slot, two keys.
        let key1 = 0x42;
        let key2 = key1 + tt.table.len() as u64;
        tt.store(key1, deep);
        tt.store(key2, shallow);
        assert!(tt.probe(key1).is_valid());
        assert!(!tt.probe(key2).is_valid());
        // The deep entry survived.
        assert_eq!(tt.probe(key1).depth(), 20);
    }

    #[test]
    fn aging_lets_new_entries_in() {
        let mut tt = TranspositionTable::with_size(MIN_TT_SIZE);
        let deep = Data::new(sample_move(), 10, 12, Bound::Exact, false);
        let key1 = 0x1000;
        let key2 = key1 + tt.table.len() as u64;
        tt.store(key1, deep);
        for _ in 0..60 {
            tt.next_epoch();
        }
        let fresh = Data::new(sample_move(), -4, 2, Bound::Exact, false);
        tt.store(key2, fresh);
        assert!(tt.probe(key2).is_valid());
        assert!(!tt.probe(key1).is_valid());
    }

    #[test]
    fn clear_wipes_everything(){
        let mut tt = TranspositionTable::with_size(MIN_TT_SIZE);
        for key in 0..512u64 {
            tt.store(key.wrapping_mul(0x9e37_79b9_7f4a_7c15), Data::new(sample_move(), 1, 3, Bound::Exact, false));
        }
        assert!(tt.hash_full() > 0);
        tt.clear(2);
        assert_eq!(tt.hash_full(), 0);
    }

    #[test]
    fn resize_preserves_entries_on_grow() {
        let mut tt = TranspositionTable::with_size(MIN_TT_SIZE);
        let key = 0xabcd_ef01_2345_6789;
        tt.store(key, Data::new(sample_move(), 55, 8, Bound::Exact, true));
        tt.resize(4 * MIN_TT_SIZE, false, 2);
        let got = tt.probe(key);
        assert!(got.is_valid());
        assert_eq!(got.score(), 55);
        // And clearing on resize drops it.
        tt.resize(MIN_TT_SIZE, true, 2);
        assert!(!tt.probe(key).is_valid());
    }
}
