//! Constant values tuning the search.

/// Maximum search depth. Bounded by the depth byte of a transposition table
/// entry.
pub const MAX_DEPTH: usize = 255;

/// Number of frames on the search stack. Recursion is cut to quiescence when
/// the next frame would overflow this.
pub const MAX_STACK_DEPTH: usize = 256;

/// How many nodes pass between two checks of the stop flag deadline.
pub const STOP_POLL_MASK: u64 = 4095;

/// Futility pruning parameters.
pub mod futility {
    use sofcheck::core::score::Value;

    /// Apply futility pruning only at this depth or below.
    pub const MAX_DEPTH: i32 = 2;

    /// The margin added to beta before comparing against the static
    /// evaluation.
    pub const MARGIN: Value = 250;
}

/// Null-move reduction parameters.
pub mod null_move {
    /// Try a null move only at this depth or above.
    pub const MIN_DEPTH: i32 = 4;

    /// Depth decrease of the verification search.
    pub const DEPTH_DEC: i32 = 3;

    /// Depth reduction applied after the verification search fails high.
    pub const REDUCTION_DEC: i32 = 3;
}

/// Late-move reduction parameters.
pub mod late_move {
    /// Apply the reduction only at this depth or above.
    pub const MIN_DEPTH: i32 = 3;

    /// How many history moves escape the reduction.
    pub const MOVES_NO_REDUCE: usize = 1;

    /// Depth reduction of the probing search.
    pub const REDUCE_DEPTH: i32 = 1;
}
