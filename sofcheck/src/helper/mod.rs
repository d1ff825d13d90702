//! Statically initialized lookup tables: near attacks, magic sliders,
//! `between` rays and the Zobrist keys. See [`prelude`] for the lookup
//! functions.
//!
//! [`prelude`]: prelude/index.html

pub mod boards;
pub mod magic;
pub mod prelude;
pub mod zobrist;

/// Initializes every global lookup table, including those of the evaluator.
/// Must be called once before any other core API; repeated calls are cheap
/// no-ops.
#[cold]
pub fn init() {
    prelude::init_statics();
    crate::eval::init_eval_statics();
}
