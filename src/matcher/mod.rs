//! Identifier matcher
//!
//! Finds a column identifier as a standalone token inside free-form SQL text.
//! A match is the identifier (compared case-insensitively) whose neighbouring
//! characters do not lower-case to ASCII alphanumerics or `_`, so `id` never
//! matches inside `valid` or `id2`.
//!
//! The quoting delimiters `[`, `]`, `"` and `` ` `` are not word characters, so
//! `[id]`, `"id"` and `` `id` `` all match. The two sides are checked
//! independently: `[id"` matches as well. Delimiters are never part of the
//! match itself, so a replacement keeps whatever quoting surrounded the
//! original identifier.
//!
//! The scanner and the renamer both go through [`IdentifierPattern`], which
//! keeps reported counts and rewritten positions identical.

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::ops::Range;

use crate::core::error::{SweepError, SweepResult};

/// A compiled, boundary-checked pattern for one identifier
#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    regex: Regex,
}

impl IdentifierPattern {
    /// Compile `identifier` as a literal, case-insensitive pattern.
    pub fn new(identifier: &str) -> SweepResult<Self> {
        if identifier.is_empty() {
            return Err(SweepError::EmptyIdentifier);
        }

        // The escaped literal only fails to build when it exceeds the regex
        // size limit.
        let regex = RegexBuilder::new(&regex::escape(identifier))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                SweepError::InvalidInput(format!("cannot compile identifier '{identifier}': {e}"))
            })?;

        Ok(Self { regex })
    }

    /// Leftmost, non-overlapping occurrences as byte ranges into `text`
    pub fn find_iter<'p, 't>(&'p self, text: &'t str) -> Occurrences<'p, 't> {
        Occurrences {
            regex: &self.regex,
            text,
            next: 0,
        }
    }

    pub fn count(&self, text: &str) -> usize {
        self.find_iter(text).count()
    }

    /// Substitute every occurrence with `replacement`, inserted verbatim.
    ///
    /// Borrows the input when nothing matched.
    pub fn replace_all<'t>(&self, text: &'t str, replacement: &str) -> Cow<'t, str> {
        let mut occurrences = self.find_iter(text).peekable();
        if occurrences.peek().is_none() {
            return Cow::Borrowed(text);
        }

        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        for range in occurrences {
            output.push_str(&text[last..range.start]);
            output.push_str(replacement);
            last = range.end;
        }
        output.push_str(&text[last..]);

        Cow::Owned(output)
    }
}

/// Iterator over boundary-safe occurrences, see [`IdentifierPattern::find_iter`]
pub struct Occurrences<'p, 't> {
    regex: &'p Regex,
    text: &'t str,
    next: usize,
}

impl Iterator for Occurrences<'_, '_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next <= self.text.len() {
            let found = self.regex.find_at(self.text, self.next)?;
            if is_token_boundary(self.text, found.start(), found.end()) {
                self.next = found.end();
                return Some(found.range());
            }

            // A rejected candidate may still overlap a valid one that starts
            // one character later.
            let step = self.text[found.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.next = found.start() + step;
        }
        None
    }
}

/// Characters that glue an identifier to its neighbours
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Judge a neighbour by its lower-case form, on the side that touches the
/// identifier. The scanner sees lower-cased text, so `K` (Kelvin sign) must
/// count as `k` here too, and `İ` as `i` followed by a combining dot.
fn glues_before(c: char) -> bool {
    c.to_lowercase().next_back().is_some_and(is_word_char)
}

fn glues_after(c: char) -> bool {
    c.to_lowercase().next().is_some_and(is_word_char)
}

fn is_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(glues_before) && !after.is_some_and(glues_after)
}

/// Replace line feeds with spaces before counting.
///
/// Offsets found in the flattened copy equal offsets in the original, since
/// `\n` and ` ` are both one byte.
pub fn flatten_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        Cow::Owned(text.replace('\n', " "))
    } else {
        Cow::Borrowed(text)
    }
}
