//! Search limits and thinking-time allocation.

use sofcheck::Board;

use std::time::Duration;

/// Depth value meaning "no depth limit".
pub const DEPTH_UNLIMITED: usize = usize::max_value();

/// Node count meaning "no node limit".
pub const NODES_UNLIMITED: u64 = u64::max_value();

/// Clock state of one player.
#[derive(Copy, Clone, Debug, Default)]
pub struct ClockControl {
    /// Time left on the clock, if the GUI told us.
    pub time: Option<Duration>,
    /// Increment per move.
    pub inc: Duration,
}

/// A time control as sent by the `go` command.
#[derive(Copy, Clone, Debug, Default)]
pub struct TimeControl {
    pub white: ClockControl,
    pub black: ClockControl,
    /// Moves until the next time control, if known.
    pub moves_to_go: Option<u32>,
}

impl TimeControl {
    /// The clock of one side.
    pub fn side(&self, side: sofcheck::Color) -> ClockControl {
        match side {
            sofcheck::Color::White => self.white,
            sofcheck::Color::Black => self.black,
        }
    }
}

/// Limits of one search request.
#[derive(Clone, Debug)]
pub struct SearchLimits {
    /// Maximum depth, or `DEPTH_UNLIMITED`.
    pub depth: usize,
    /// Maximum node count, or `NODES_UNLIMITED`.
    pub nodes: u64,
    /// Maximum wall time, or `None` when unlimited.
    pub time: Option<Duration>,
    /// The original time control, when the search runs under one.
    pub time_control: Option<TimeControl>,
}

impl SearchLimits {
    /// No limits at all; the search runs until `stop`.
    pub fn with_infinite() -> SearchLimits {
        SearchLimits {
            depth: DEPTH_UNLIMITED,
            nodes: NODES_UNLIMITED,
            time: None,
            time_control: None,
        }
    }

    /// Fixed-depth search.
    pub fn with_fixed_depth(depth: usize) -> SearchLimits {
        SearchLimits {
            depth,
            ..SearchLimits::with_infinite()
        }
    }

    /// Fixed-node search.
    pub fn with_fixed_nodes(nodes: u64) -> SearchLimits {
        SearchLimits {
            nodes,
            ..SearchLimits::with_infinite()
        }
    }

    /// Fixed wall-time search.
    pub fn with_fixed_time(time: Duration) -> SearchLimits {
        SearchLimits {
            time: Some(time),
            ..SearchLimits::with_infinite()
        }
    }

    /// Builds limits from a time control, allocating the thinking time for
    /// this move.
    pub fn with_time_control(board: &Board, tc: TimeControl) -> SearchLimits {
        SearchLimits {
            time: Some(calculate_max_time(board, &tc)),
            time_control: Some(tc),
            ..SearchLimits::with_infinite()
        }
    }
}

const HARD_TIME_MARGIN_PER_MOVE: Duration = Duration::from_millis(3);
const HARD_TIME_MARGIN: Duration = Duration::from_millis(250);
const SOFT_TIME_MARGIN_PER_MOVE: Duration = Duration::from_millis(5);
const SOFT_TIME_MARGIN: Duration = Duration::from_millis(350);
const MIN_TIME_MARGIN: Duration = Duration::from_millis(20);

const MAX_MOVES_LEFT: u32 = 50;
const MAX_MOVES_TO_GO: u32 = 1000;

fn do_calculate_max_time(board: &Board, total: Duration, moves_to_go: u32, margin: Duration) -> Duration {
    let mut moves_left = MAX_MOVES_LEFT.min(moves_to_go).max(1);
    if board.move_number() < 10 {
        // Don't think too much on the first moves.
        moves_left *= 2;
    }
    ((total - margin) / moves_left).max(Duration::from_millis(2))
}

fn calculate_max_time(board: &Board, tc: &TimeControl) -> Duration {
    let clock = tc.side(board.side());
    let moves_to_go = tc.moves_to_go.map_or(MAX_MOVES_TO_GO, |m| m.min(MAX_MOVES_TO_GO)).max(1);
    // A missing clock from the GUI is dubious; assume an hour rather than
    // infinity.
    let total = clock.time.unwrap_or_else(|| Duration::from_secs(3600));

    let hard_margin = HARD_TIME_MARGIN.min(MIN_TIME_MARGIN + HARD_TIME_MARGIN_PER_MOVE * moves_to_go);
    let soft_margin = SOFT_TIME_MARGIN.min(MIN_TIME_MARGIN + SOFT_TIME_MARGIN_PER_MOVE * moves_to_go);

    // Safeguards against time forfeit.
    if total <= hard_margin {
        return Duration::from_millis(1);
    }
    if total <= soft_margin {
        return Duration::from_millis(2);
    }

    let mut time = do_calculate_max_time(board, total, moves_to_go, soft_margin) + clock.inc;
    time = time.min(total - hard_margin);
    time.max(Duration::from_millis(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc_with_time(ms: u64) -> TimeControl {
        TimeControl {
            white: ClockControl {
                time: Some(Duration::from_millis(ms)),
                inc: Duration::from_millis(0),
            },
            black: ClockControl::default(),
            moves_to_go: None,
        }
    }

    #[test]
    fn almost_no_time_moves_immediately() {
        sofcheck::init();
        let board = Board::initial();
        let limits = SearchLimits::with_time_control(&board, tc_with_time(100));
        assert!(limits.time.unwrap() <= Duration::from_millis(2));
    }

    #[test]
    fn opening_moves_get_less_time() {
        sofcheck::init();
        let board = Board::initial();
        let limits = SearchLimits::with_time_control(&board, tc_with_time(60_000));
        // 1/100th of the budget in the opening (50 moves left, doubled).
        let t = limits.time.unwrap();
        assert!(t >= Duration::from_millis(400));
        assert!(t <= Duration::from_millis(700));
    }

    #[test]
    fn increment_is_added() {
        sofcheck::init();
        let board = Board::initial();
        let mut tc = tc_with_time(60_000);
        tc.white.inc = Duration::from_millis(1000);
        let with_inc = SearchLimits::with_time_control(&board, tc).time.unwrap();
        let without = SearchLimits::with_time_control(&board, tc_with_time(60_000))
            .time
            .unwrap();
        assert_eq!(with_inc, without + Duration::from_millis(1000));
    }

    #[test]
    fn hard_margin_clamps() {
        sofcheck::init();
        let board = Board::initial();
        let mut tc = tc_with_time(60_000);
        tc.white.inc = Duration::from_secs(600);
        let t = SearchLimits::with_time_control(&board, tc).time.unwrap();
        assert!(t <= Duration::from_millis(60_000) - HARD_TIME_MARGIN);
    }
}
