//! Line tokenizer shared by the OBJ and MTL parsers.
//!
//! Splits text into directive lines. Blank lines and lines whose first
//! non-whitespace character is `#` are skipped.

use std::iter::Enumerate;
use std::str;

/// One directive line: a keyword plus its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the source text
    pub number: usize,

    /// First whitespace-delimited token (e.g. `v`, `usemtl`)
    pub keyword: &'a str,

    /// Arguments split on whitespace
    pub parts: Vec<&'a str>,

    /// Everything after the keyword, with embedded whitespace kept intact.
    /// Used for names and paths that may contain spaces.
    pub remainder: &'a str,
}

/// Lazy iterator over the directive lines of a text blob.
pub struct Lines<'a> {
    inner: Enumerate<str::Lines<'a>>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for (i, raw) in self.inner.by_ref() {
            if let Some(line) = tokenize_line(i + 1, raw) {
                return Some(line);
            }
        }
        None
    }
}

/// Tokenize `text` into directive lines.
pub fn tokenize(text: &str) -> Lines<'_> {
    Lines {
        inner: text.lines().enumerate(),
    }
}

fn tokenize_line(number: usize, raw: &str) -> Option<Line<'_>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (keyword, remainder) = match trimmed.find(char::is_whitespace) {
        Some(pos) => (&trimmed[..pos], trimmed[pos..].trim_start()),
        None => (trimmed, ""),
    };

    Some(Line {
        number,
        keyword,
        parts: remainder.split_whitespace().collect(),
        remainder,
    })
}
