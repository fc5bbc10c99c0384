//! Splitting zone file text into entries.
//!
//! An entry is one record or directive, reassembled from however many
//! physical lines it was written over: comments are removed, lines
//! joined while a `(` is open (or a quoted string is), grouping
//! parentheses dropped, and whitespace outside quotes normalised.
//! Quoted strings are copied through untouched, so `;`, `(`, and `)`
//! inside quotes are just text.

/// Where the scanner is relative to quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Quoted,
    /// Just seen a `\`, in or out of quotes.
    Escape { quoted: bool },
}

/// Accumulates the entry currently being read.
#[derive(Debug)]
struct Scanner {
    state: State,
    depth: usize,
    entry: String,
    /// Length of the current run of unquoted whitespace.  Runs are
    /// written out as at most two spaces.
    space_run: usize,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: State::Normal,
            depth: 0,
            entry: String::new(),
            space_run: 0,
        }
    }

    fn in_quote(&self) -> bool {
        matches!(
            self.state,
            State::Quoted | State::Escape { quoted: true }
        )
    }

    fn push(&mut self, c: char) {
        self.entry.push(c);
        self.space_run = 0;
    }

    fn push_space(&mut self) {
        if self.space_run < 2 {
            self.entry.push(' ');
        }
        self.space_run += 1;
    }

    /// Number of trailing spaces which `push_space` wrote.
    fn trailing_spaces(&self) -> usize {
        self.space_run.min(2)
    }

    /// Scan one physical line into the entry.  Returns whether the line
    /// had any content (after removing its comment).
    fn scan_line(&mut self, line: &str) -> bool {
        let mut content = false;

        for c in line.chars() {
            match self.state {
                State::Normal => match c {
                    ';' => break,
                    '"' => {
                        self.push(c);
                        self.state = State::Quoted;
                    }
                    '\\' => {
                        self.push(c);
                        self.state = State::Escape { quoted: false };
                    }
                    '(' => {
                        self.depth += 1;
                        self.push_space();
                    }
                    ')' => {
                        self.depth = self.depth.saturating_sub(1);
                        self.push_space();
                    }
                    c if c.is_whitespace() => {
                        self.push_space();
                        continue;
                    }
                    _ => self.push(c),
                },
                State::Quoted => {
                    match c {
                        '"' => self.state = State::Normal,
                        '\\' => self.state = State::Escape { quoted: true },
                        _ => (),
                    }
                    self.push(c);
                }
                State::Escape { quoted } => {
                    self.push(c);
                    self.state = if quoted { State::Quoted } else { State::Normal };
                }
            }
            content = true;
        }

        // a trailing backslash outside quotes escapes nothing
        if self.state == (State::Escape { quoted: false }) {
            self.state = State::Normal;
        }

        content
    }

    /// Take the entry, if it is complete.
    fn finish(&mut self) -> Option<String> {
        if self.depth > 0 || self.in_quote() {
            return None;
        }

        let keep = self.entry.len() - self.trailing_spaces();
        self.entry.truncate(keep);
        self.space_run = 0;

        if self.entry.trim().is_empty() {
            self.entry.clear();
            None
        } else {
            Some(std::mem::take(&mut self.entry))
        }
    }
}

/// Split zone file text into entries.
///
/// An entry which starts with whitespace keeps (up to two characters
/// of) it, as that means the entry has no label.  An entry still open
/// at the end of the text (an unclosed `(` or `"`) is dropped.
pub fn extract_entries(data: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut scanner = Scanner::new();

    for (i, line) in data.lines().enumerate() {
        let was_quoted = scanner.in_quote();
        let rollback = (scanner.entry.len(), scanner.space_run);

        if !scanner.entry.is_empty() {
            if was_quoted {
                scanner.push(' ');
                if let State::Escape { quoted: true } = scanner.state {
                    scanner.state = State::Quoted;
                }
            } else {
                scanner.push_space();
            }
        }

        if !scanner.scan_line(line) && !was_quoted {
            // blank or comment-only: as if the line were not there
            scanner.entry.truncate(rollback.0);
            scanner.space_run = rollback.1;
            continue;
        }

        if let Some(entry) = scanner.finish() {
            tracing::trace!(line = i + 1, %entry, "entry");
            entries.push(entry);
        }
    }

    if !scanner.entry.trim().is_empty() {
        tracing::warn!(
            entry = %scanner.entry,
            depth = scanner.depth,
            quoted = scanner.in_quote(),
            "dropping unterminated entry at end of input"
        );
    }

    entries
}
