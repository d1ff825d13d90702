//! The UCI protocol layer: the only part of the engine that talks to the
//! outside world.
//!
//! The [`Server`] trait is the sink for everything the engine emits; the
//! search and the runner never print anything themselves. [`StdoutServer`]
//! implements it over standard output for the real protocol session.
//!
//! [`Server`]: trait.Server.html
//! [`StdoutServer`]: struct.StdoutServer.html

pub mod options;
pub mod parse;

use sofcheck::core::score::{Value, SCORE_CHECKMATE, SCORE_CHECKMATE_THRESHOLD};
use sofcheck::tools::tt::Bound;
use sofcheck::Move;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// The engine-to-GUI message sink. Implementations must be callable from the
/// search threads.
pub trait Server: Send + Sync {
    /// A completed depth: `info depth ... pv ... score ...`.
    fn send_result(&self, depth: usize, time: Duration, pv: &[Move], score: Value, bound: Bound);

    /// Periodic progress: `info nodes ... time ... nps ...`.
    fn send_nodes(&self, nodes: u64, time: Duration);

    /// Table fill rate: `info hashfull <permille>`.
    fn send_hashfull(&self, _permille: u32) {}

    /// A human-readable message: `info string ...`.
    fn send_string(&self, msg: &str);

    /// The final `bestmove`.
    fn send_best_move(&self, mov: Move);
}

/// `Server` implementation writing UCI lines to standard output. An output
/// failure raises a flag the command loop checks; the engine then shuts
/// down, since a GUI that closed our pipe is gone for good.
pub struct StdoutServer {
    failed: AtomicBool,
}

impl StdoutServer {
    pub fn new() -> StdoutServer {
        StdoutServer {
            failed: AtomicBool::new(false),
        }
    }

    /// Returns `true` after any write error.
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn write_line(&self, line: &str) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if writeln!(lock, "{}", line).and_then(|_| lock.flush()).is_err() {
            self.failed.store(true, Ordering::Release);
        }
    }
}

impl Default for StdoutServer {
    fn default() -> Self {
        StdoutServer::new()
    }
}

/// Formats a score the UCI way: `cp <centipawns>` for normal scores,
/// `mate <moves>` for forced mates (negative when we are the one mated).
pub fn format_score(score: Value) -> String {
    if score >= SCORE_CHECKMATE_THRESHOLD {
        format!("mate {}", (SCORE_CHECKMATE - score + 1) / 2)
    } else if score <= -SCORE_CHECKMATE_THRESHOLD {
        format!("mate {}", -((score + SCORE_CHECKMATE) / 2))
    } else {
        format!("cp {}", score)
    }
}

impl Server for StdoutServer {
    fn send_result(&self, depth: usize, time: Duration, pv: &[Move], score: Value, bound: Bound) {
        let mut line = format!("info depth {} time {}", depth, time.as_millis());
        if !pv.is_empty() {
            line.push_str(" pv");
            for mov in pv.iter() {
                line.push(' ');
                line.push_str(&mov.to_string());
            }
        }
        line.push_str(" score ");
        line.push_str(&format_score(score));
        match bound {
            Bound::Exact => {}
            Bound::Lowerbound => line.push_str(" lowerbound"),
            Bound::Upperbound => line.push_str(" upperbound"),
        }
        self.write_line(&line);
    }

    fn send_nodes(&self, nodes: u64, time: Duration) {
        let millis = time.as_millis() as u64;
        let mut line = format!("info nodes {} time {}", nodes, millis);
        if millis > 0 {
            line.push_str(&format!(" nps {}", nodes * 1000 / millis));
        }
        self.write_line(&line);
    }

    fn send_hashfull(&self, permille: u32) {
        self.write_line(&format!("info hashfull {}", permille));
    }

    fn send_string(&self, msg: &str) {
        // The protocol is line-oriented; embedded newlines would fake
        // messages.
        let sanitized: String = msg
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        self.write_line(&format!("info string {}", sanitized));
    }

    fn send_best_move(&self, mov: Move) {
        self.write_line(&format!("bestmove {}", mov));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sofcheck::core::score::{score_checkmate_lose, score_checkmate_win};

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(123), "cp 123");
        assert_eq!(format_score(-5), "cp -5");
        assert_eq!(format_score(score_checkmate_win(1)), "mate 1");
        assert_eq!(format_score(score_checkmate_win(3)), "mate 2");
        assert_eq!(format_score(score_checkmate_win(5)), "mate 3");
        assert_eq!(format_score(score_checkmate_lose(2)), "mate -1");
        assert_eq!(format_score(score_checkmate_lose(4)), "mate -2");
    }
}
