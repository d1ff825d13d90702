//! Miscellaneous tools used for searching. Most notably this module contains
//! the [`TranspositionTable`], a lock-free lookup table shared between all
//! search threads, and the deterministic [`PRNG`] that seeds the global
//! tables.
//!
//! [`TranspositionTable`]: tt/struct.TranspositionTable.html
//! [`PRNG`]: prng/struct.PRNG.html

pub mod prng;
pub mod tt;

/// Prefetches `ptr` into all levels of the CPU cache.
///
/// On platforms without SSE this compiles down to nothing.
#[inline(always)]
pub fn prefetch_read<T>(ptr: *const T) {
    __prefetch_read::<T>(ptr);
}

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse"
))]
#[inline(always)]
fn __prefetch_read<T>(ptr: *const T) {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::{_mm_prefetch, _MM_HINT_T0};
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
    unsafe {
        _mm_prefetch(ptr as *const i8, _MM_HINT_T0);
    }
}

#[cfg(not(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse"
)))]
#[inline(always)]
fn __prefetch_read<T>(_ptr: *const T) {
    // Do nothing
}
