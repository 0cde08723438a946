//! Literal identifier search over source lines
//!
//! Purely textual: an occurrence is a whole-word match outside a quoted
//! string. Comments and JSX text still count.

use std::ops::Range;

use regex::Regex;

/// Finds whole-word occurrences of one identifier.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    name: String,
    pattern: Regex,
}

impl WordMatcher {
    pub fn new(name: &str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        let pattern = Regex::new(&format!(r"(?:^|[^\w$]){}(?:$|[^\w$])", regex::escape(name))).ok()?;
        Some(WordMatcher {
            name: name.to_string(),
            pattern,
        })
    }

    /// Byte offsets where the identifier starts.
    pub fn find(&self, line: &str) -> Vec<usize> {
        let strings = string_ranges(line);
        let mut starts = Vec::new();
        let mut from = 0;
        while from < line.len() {
            let Some(m) = self.pattern.find_at(line, from) else {
                break;
            };
            // The match carries at most one boundary character on each side
            let Some(offset) = line[m.start()..m.end()].find(&self.name) else {
                break;
            };
            let start = m.start() + offset;
            if !strings.iter().any(|r| r.contains(&start)) {
                starts.push(start);
            }
            from = start + self.name.len();
        }
        starts
    }

    pub fn mentions(&self, line: &str) -> bool {
        !self.find(line).is_empty()
    }

    /// `line` with every occurrence replaced by `after`.
    pub fn replace(&self, line: &str, after: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for start in self.find(line) {
            out.push_str(&line[last..start]);
            out.push_str(after);
            last = start + self.name.len();
        }
        out.push_str(&line[last..]);
        out
    }
}

/// Byte ranges of the `'...'` and `"..."` literals on `line`, quotes included.
///
/// A quote only opens a literal in code position: not right after a word
/// character (`Don't`), and only when it closes on the same line. Nothing
/// after a `//` is a literal. Template literals are treated as code since
/// `${...}` holds expressions.
fn string_ranges(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut ranges = Vec::new();
    let mut prev: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            break;
        }
        if (c == b'\'' || c == b'"') && !prev.is_some_and(is_word_byte) {
            if let Some(len) = closing_quote(&bytes[i + 1..], c) {
                let end = i + len + 2;
                ranges.push(i..end);
                prev = Some(c);
                i = end;
                continue;
            }
        }
        prev = Some(c);
        i += 1;
    }
    ranges
}

/// Offset of the unescaped `quote` that ends a literal, if any.
fn closing_quote(rest: &[u8], quote: u8) -> Option<usize> {
    let mut escaped = false;
    for (offset, &b) in rest.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == quote {
            return Some(offset);
        }
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || !b.is_ascii()
}
