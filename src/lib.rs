//! Compile small regular expressions to deterministic automata and report
//! every (possibly overlapping) match in a line of bytes.
//!
//! The pattern language: literal bytes, `\` escapes (`\t`, `\n`, `\r`,
//! anything else literally), `[...]` / `[^...]` byte classes with `-`
//! ranges, `.` (any byte), `?` (any byte or nothing), `|`, `*`, `+`, and
//! `(...)` grouping. Concatenation is implicit.
//!
//! Compilation builds an epsilon-NFA with Thompson-style fragment
//! composition, then determinizes it with memoized subset construction.
//! Scanning keeps one cursor per start offset, so every match is found, not
//! just the leftmost-longest one.
//!
//! ```
//! use linegrep::Matcher;
//!
//! let matcher = Matcher::compile("(a|b)*c").unwrap();
//! assert!(matcher.accepts("aabc"));
//!
//! let ends = matcher.scan("aabc");
//! assert_eq!(ends[0], vec![4]); // "aabc" itself matches
//! assert_eq!(ends[3], vec![4]); // and so does the bare "c"
//! ```

mod automaton;
mod regexp;

pub use regexp::ParseError;

use automaton::Dfa;
use log::debug;

/// A compiled pattern, ready to scan any number of lines.
#[derive(Debug)]
pub struct Matcher {
    dfa: Dfa,
}

impl Matcher {
    /// Compile `pattern` into a deterministic matcher.
    pub fn compile(pattern: impl AsRef<[u8]>) -> Result<Self, ParseError> {
        let pattern = pattern.as_ref();
        let dfa = regexp::compile(pattern)?;
        debug!(
            "compiled {}-byte pattern into {} DFA states",
            pattern.len(),
            dfa.len()
        );
        Ok(Matcher { dfa })
    }

    /// Whole-input acceptance: does the pattern match exactly `text`?
    pub fn accepts(&self, text: impl AsRef<[u8]>) -> bool {
        self.dfa.accepts(text.as_ref())
    }

    /// All matches in `line`, indexed by start offset: `scan(line)[s]` is
    /// the ascending list of end offsets `e` with `line[s..e]` matching.
    pub fn scan(&self, line: impl AsRef<[u8]>) -> Vec<Vec<usize>> {
        self.dfa.scan(line.as_ref())
    }

    /// All matches in `line` as flat `(start, end)` byte ranges, ordered by
    /// start and then by end.
    pub fn matches(&self, line: impl AsRef<[u8]>) -> Vec<(usize, usize)> {
        self.dfa
            .scan(line.as_ref())
            .into_iter()
            .enumerate()
            .flat_map(|(start, ends)| ends.into_iter().map(move |end| (start, end)))
            .collect()
    }
}
