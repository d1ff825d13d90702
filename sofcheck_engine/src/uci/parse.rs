//! Parsing of UCI input: the `position` command and the `go` limits.

use crate::search::Position;
use crate::time::{SearchLimits, TimeControl};

use sofcheck::board::movegen::is_move_legal;
use sofcheck::core::piece_move::move_parse;
use sofcheck::board::move_make;
use sofcheck::Board;

use std::time::Duration;

/// Why a `position` command was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum PositionParseError {
    /// Neither `startpos` nor `fen` followed the command.
    UnknownStart,
    /// The FEN string failed to parse or validate.
    BadFen(String),
    /// A move in the list was malformed, impossible or illegal.
    BadMove(String),
}

impl std::fmt::Display for PositionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PositionParseError::UnknownStart => write!(f, "expected 'startpos' or 'fen'"),
            PositionParseError::BadFen(msg) => write!(f, "cannot parse fen: {}", msg),
            PositionParseError::BadMove(mov) => write!(f, "bad move '{}'", mov),
        }
    }
}

/// Parses the arguments of `position (startpos | fen <FEN>) [moves ...]`.
/// Every move must be well-formed, pseudo-legal and legal, otherwise the
/// whole command is rejected.
pub fn parse_position(args: &[&str]) -> Result<Position, PositionParseError> {
    let mut moves_at = args.len();
    for (i, tok) in args.iter().enumerate() {
        if *tok == "moves" {
            moves_at = i;
            break;
        }
    }

    let board = match args.first() {
        Some(&"startpos") => Board::initial(),
        Some(&"fen") => {
            let fen = args[1..moves_at].join(" ");
            Board::from_fen(&fen).map_err(|e| PositionParseError::BadFen(e.to_string()))?
        }
        _ => return Err(PositionParseError::UnknownStart),
    };

    let mut moves = Vec::new();
    let mut cursor = board.clone();
    for tok in args.iter().skip(moves_at + 1) {
        let mov = move_parse(tok, &cursor);
        if mov.is_invalid() || !is_move_legal(&cursor, mov) {
            return Err(PositionParseError::BadMove((*tok).to_string()));
        }
        move_make(&mut cursor, mov);
        moves.push(mov);
    }

    Ok(Position::from_moves(board, moves))
}

fn parse_millis(token: Option<&&str>) -> Option<Duration> {
    token
        .and_then(|t| t.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Parses the arguments of `go`. The modes `depth`, `nodes`, `movetime` and
/// `infinite` are exclusive; otherwise a time control is assembled from
/// `wtime`/`btime`/`winc`/`binc`/`movestogo`. Unknown subcommands are
/// skipped; `searchmoves`, `ponder` and `mate` are accepted but not acted
/// upon.
pub fn parse_go(args: &[&str], board: &Board) -> SearchLimits {
    let mut depth: Option<usize> = None;
    let mut nodes: Option<u64> = None;
    let mut move_time: Option<Duration> = None;
    let mut infinite = false;
    let mut timer = TimeControl::default();
    let mut has_timer = false;

    let mut idx = 0;
    while idx < args.len() {
        match args[idx] {
            "infinite" => infinite = true,
            "ponder" => {}
            "wtime" => {
                if let Some(t) = parse_millis(args.get(idx + 1)) {
                    timer.white.time = Some(t);
                    has_timer = true;
                    idx += 1;
                }
            }
            "btime" => {
                if let Some(t) = parse_millis(args.get(idx + 1)) {
                    timer.black.time = Some(t);
                    has_timer = true;
                    idx += 1;
                }
            }
            "winc" => {
                if let Some(t) = parse_millis(args.get(idx + 1)) {
                    timer.white.inc = t;
                    has_timer = true;
                    idx += 1;
                }
            }
            "binc" => {
                if let Some(t) = parse_millis(args.get(idx + 1)) {
                    timer.black.inc = t;
                    has_timer = true;
                    idx += 1;
                }
            }
            "movestogo" => {
                if let Some(m) = args.get(idx + 1).and_then(|t| t.parse::<u32>().ok()) {
                    timer.moves_to_go = Some(m);
                    has_timer = true;
                    idx += 1;
                }
            }
            "depth" => {
                if let Some(d) = args.get(idx + 1).and_then(|t| t.parse::<usize>().ok()) {
                    depth = Some(d);
                    idx += 1;
                }
            }
            "nodes" => {
                if let Some(n) = args.get(idx + 1).and_then(|t| t.parse::<u64>().ok()) {
                    nodes = Some(n);
                    idx += 1;
                }
            }
            "movetime" => {
                if let Some(t) = parse_millis(args.get(idx + 1)) {
                    move_time = Some(t);
                    idx += 1;
                }
            }
            "mate" => {
                // Accepted, not acted upon.
                if args.get(idx + 1).map_or(false, |t| t.parse::<u16>().is_ok()) {
                    idx += 1;
                }
            }
            "searchmoves" => {
                // Swallow the move tokens; restricting the search is not
                // supported.
                while args
                    .get(idx + 1)
                    .map_or(false, |t| !is_go_keyword(t))
                {
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    if let Some(d) = depth {
        SearchLimits::with_fixed_depth(d)
    } else if let Some(n) = nodes {
        SearchLimits::with_fixed_nodes(n)
    } else if let Some(t) = move_time {
        SearchLimits::with_fixed_time(t)
    } else if infinite || !has_timer {
        SearchLimits::with_infinite()
    } else {
        SearchLimits::with_time_control(board, timer)
    }
}

fn is_go_keyword(arg: &str) -> bool {
    matches!(
        arg,
        "searchmoves"
            | "ponder"
            | "wtime"
            | "btime"
            | "winc"
            | "binc"
            | "movestogo"
            | "depth"
            | "nodes"
            | "mate"
            | "movetime"
            | "infinite"
    )
}
