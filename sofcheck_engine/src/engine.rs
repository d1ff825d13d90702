//! The engine front end: the UCI command loop wiring standard input to the
//! job runner.

use crate::runner::JobRunner;
use crate::search::Position;
use crate::uci::options::{OptionWork, OptionsMap};
use crate::uci::{parse, Server, StdoutServer};

use sofcheck::Board;

use std::io::{self, BufRead};
use std::sync::Arc;

/// Engine identification reported in response to `uci`.
pub static ID_NAME: &str = "SoFCheck";
pub static ID_AUTHOR: &str = "SoFCheck contributors";

/// The engine client: owns the runner, the option registry and the current
/// position.
pub struct UciClient {
    server: Arc<StdoutServer>,
    runner: JobRunner,
    options: OptionsMap,
    position: Position,
}

impl UciClient {
    pub fn new() -> UciClient {
        sofcheck::init();
        let server = Arc::new(StdoutServer::new());
        let runner = JobRunner::new(Arc::clone(&server) as Arc<dyn Server>);
        UciClient {
            server,
            runner,
            options: OptionsMap::new(),
            position: Position::from_moves(Board::initial(), Vec::new()),
        }
    }

    /// Runs the command loop until `quit` or end of input. Returns cleanly;
    /// the process exit code is 0 on this path.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break, // EOF behaves like `quit`
                Ok(_) => {}
            }
            if self.server.is_failed() {
                break;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            // Per the UCI spec, skip unknown leading tokens until a
            // recognized command name appears.
            let mut handled = false;
            for start in 0..tokens.len() {
                if self.dispatch(&tokens[start..], &mut handled) {
                    // `quit` (or a fatal output error) terminates the loop.
                    self.runner.join();
                    return;
                }
                if handled {
                    break;
                }
            }
        }
        self.runner.join();
    }

    // Handles one command starting at `tokens[0]`. Sets `handled` when the
    // first token was a recognized command; returns `true` to quit.
    fn dispatch(&mut self, tokens: &[&str], handled: &mut bool) -> bool {
        *handled = true;
        match tokens[0] {
            "uci" => self.cmd_uci(),
            "debug" => match tokens.get(1) {
                Some(&"on") => self.runner.set_debug_mode(true),
                Some(&"off") => self.runner.set_debug_mode(false),
                _ => self.server.send_string("debug expects 'on' or 'off'"),
            },
            "isready" => {
                self.apply_option_work();
                println!("readyok");
            }
            "setoption" => self.cmd_setoption(&tokens[1..]),
            "ucinewgame" => self.runner.new_game(),
            "position" => match parse::parse_position(&tokens[1..]) {
                Ok(position) => self.position = position,
                Err(err) => self
                    .server
                    .send_string(&format!("cannot apply position: {}", err)),
            },
            "go" => {
                let limits = parse::parse_go(&tokens[1..], &self.position.last);
                self.runner.start(self.position.clone(), limits);
            }
            "stop" => self.runner.stop(),
            "quit" => return true,
            _ => {
                *handled = false;
            }
        }
        false
    }

    fn cmd_uci(&self) {
        println!("id name {}", ID_NAME);
        println!("id author {}", ID_AUTHOR);
        for line in self.options.display_all() {
            println!("{}", line);
        }
        println!("uciok");
    }

    // `setoption name <N> [value <V>]`. Option names may contain spaces, so
    // the name tokens are collected greedily up to the `value` keyword.
    fn cmd_setoption(&mut self, args: &[&str]) {
        if args.first() != Some(&"name") {
            self.server.send_string("setoption expects 'name'");
            return;
        }
        let mut name = String::new();
        let mut value = String::new();
        let mut in_value = false;
        for tok in args[1..].iter() {
            if !in_value && *tok == "value" {
                in_value = true;
                continue;
            }
            let target = if in_value { &mut value } else { &mut name };
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(tok);
        }
        if name.is_empty() {
            self.server.send_string("setoption expects an option name");
            return;
        }
        if !self.options.apply(&name, &value) {
            self.server
                .send_string(&format!("cannot set option '{}'", name));
            return;
        }
        self.apply_option_work();
    }

    fn apply_option_work(&mut self) {
        while let Some(work) = self.options.take_work() {
            match work {
                OptionWork::ClearTT => self.runner.clear_hash(),
                OptionWork::ResizeTT(bytes) => self.runner.set_hash_size(bytes),
                OptionWork::Threads(n) => self.runner.set_num_jobs(n),
            }
        }
    }
}

impl Default for UciClient {
    fn default() -> Self {
        UciClient::new()
    }
}
