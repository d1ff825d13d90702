//! The UCI option registry: declaration, listing and application of engine
//! options.
//!
//! Option names may contain spaces. The protocol does not escape them, so
//! `setoption` parsing collects name tokens greedily and matches against the
//! known option set; in `option` listings spaces are printed as `_` to keep
//! the lines unambiguous. Matching is case-sensitive.

use std::collections::VecDeque;

/// Work the engine must carry out after an option was applied.
pub enum OptionWork {
    ClearTT,
    ResizeTT(usize),
    Threads(usize),
}

/// Bounds of the `Hash` spin option, in MiB.
pub const HASH_MIN_MB: i64 = 1;
pub const HASH_MAX_MB: i64 = 131_072;
pub const HASH_DEFAULT_MB: i64 = 32;

/// Bounds of the `Threads` spin option.
pub const THREADS_MIN: i64 = 1;
pub const THREADS_MAX: i64 = 512;
pub const THREADS_DEFAULT: i64 = 1;

/// A UCI-visible engine option.
pub trait UciOption {
    /// The option type: one of `check`, `spin`, `string`, `combo`, `button`.
    fn option_type(&self) -> &'static str;

    /// The exact (unescaped) option name.
    fn option_name(&self) -> &'static str;

    /// The part of the `option` line after the type, if any.
    fn partial_display(&self) -> Option<String>;

    /// Displays the complete `option` line, with spaces in the name escaped
    /// as underscores.
    fn display(&self) -> String {
        let mut line = String::from("option name ")
            + &self.option_name().replace(' ', "_")
            + " type "
            + self.option_type();
        if let Some(rest) = self.partial_display() {
            line.push(' ');
            line.push_str(&rest);
        }
        line
    }

    /// Applies a value, possibly producing deferred work. Returns `None`
    /// when the value is not acceptable.
    fn mutate(&self, value: &str) -> Option<OptionWork>;
}

struct SpinOption {
    name: &'static str,
    default: i64,
    min: i64,
    max: i64,
    mutator: fn(i64) -> Option<OptionWork>,
}

impl UciOption for SpinOption {
    fn option_type(&self) -> &'static str {
        "spin"
    }

    fn option_name(&self) -> &'static str {
        self.name
    }

    fn partial_display(&self) -> Option<String> {
        Some(format!(
            "default {} min {} max {}",
            self.default, self.min, self.max
        ))
    }

    fn mutate(&self, value: &str) -> Option<OptionWork> {
        let parsed = value.parse::<i64>().ok()?;
        if parsed < self.min || parsed > self.max {
            return None;
        }
        (self.mutator)(parsed)
    }
}

struct ButtonOption {
    name: &'static str,
    mutator: fn() -> Option<OptionWork>,
}

impl UciOption for ButtonOption {
    fn option_type(&self) -> &'static str {
        "button"
    }

    fn option_name(&self) -> &'static str {
        self.name
    }

    fn partial_display(&self) -> Option<String> {
        None
    }

    fn mutate(&self, _value: &str) -> Option<OptionWork> {
        (self.mutator)()
    }
}

/// The sorted set of options the engine exposes, plus the queue of work
/// their application produced.
pub struct OptionsMap {
    map: Vec<Box<dyn UciOption>>,
    work: VecDeque<OptionWork>,
}

impl OptionsMap {
    pub fn new() -> OptionsMap {
        let mut map: Vec<Box<dyn UciOption>> = vec![
            Box::new(ButtonOption {
                name: "Clear hash",
                mutator: || Some(OptionWork::ClearTT),
            }),
            Box::new(SpinOption {
                name: "Hash",
                default: HASH_DEFAULT_MB,
                min: HASH_MIN_MB,
                max: HASH_MAX_MB,
                mutator: |mb| Some(OptionWork::ResizeTT((mb as usize) << 20)),
            }),
            Box::new(SpinOption {
                name: "Threads",
                default: THREADS_DEFAULT,
                min: THREADS_MIN,
                max: THREADS_MAX,
                mutator: |n| Some(OptionWork::Threads(n as usize)),
            }),
        ];
        map.sort_by(|a, b| a.option_name().cmp(b.option_name()));
        OptionsMap {
            map,
            work: VecDeque::new(),
        }
    }

    /// Lines describing every option, in sorted order.
    pub fn display_all(&self) -> Vec<String> {
        self.map.iter().map(|op| op.display()).collect()
    }

    /// Applies an option by name and value; `<empty>` denotes an empty
    /// string value. Returns whether the option was found and accepted.
    pub fn apply(&mut self, name: &str, value: &str) -> bool {
        let value = if value == "<empty>" { "" } else { value };
        for op in self.map.iter() {
            let known = op.option_name();
            // Accept the name spelled with spaces or with the underscore
            // escaping used in our own listing.
            if known == name || known.replace(' ', "_") == name {
                if let Some(work) = op.mutate(value) {
                    self.work.push_back(work);
                    return true;
                }
                return false;
            }
        }
        false
    }

    /// Pops the next piece of deferred work, if any.
    pub fn take_work(&mut self) -> Option<OptionWork> {
        self.work.pop_front()
    }
}

impl Default for OptionsMap {
    fn default() -> Self {
        OptionsMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_sorted_and_escaped() {
        let options = OptionsMap::new();
        let lines = options.display_all();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "option name Clear_hash type button");
        assert_eq!(
            lines[1],
            "option name Hash type spin default 32 min 1 max 131072"
        );
        assert_eq!(
            lines[2],
            "option name Threads type spin default 1 min 1 max 512"
        );
    }

    #[test]
    fn spin_bounds_are_enforced() {
        let mut options = OptionsMap::new();
        assert!(options.apply("Hash", "64"));
        assert!(!options.apply("Hash", "0"));
        assert!(!options.apply("Hash", "999999999"));
        assert!(!options.apply("Hash", "large"));
        match options.take_work() {
            Some(OptionWork::ResizeTT(bytes)) => assert_eq!(bytes, 64 << 20),
            _ => panic!("expected a resize"),
        }
        assert!(options.take_work().is_none());
    }

    #[test]
    fn name_matching_is_case_sensitive() {
        let mut options = OptionsMap::new();
        assert!(options.apply("Clear hash", ""));
        assert!(options.apply("Clear_hash", ""));
        assert!(!options.apply("clear hash", ""));
        assert!(!options.apply("HASH", "16"));
    }
}
