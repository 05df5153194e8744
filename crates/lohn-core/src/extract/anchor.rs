//! Anchor-based field location.
//!
//! Payroll documents have no stable schema, so every field is found relative
//! to a marker substring: either a token on the marker line itself or a line
//! at a fixed distance from it. Token offsets are layout constants and are
//! counted on a split at single spaces, so runs of spaces yield empty tokens.

use std::borrow::Cow;

use crate::error::ExtractionError;

use super::Result;

/// First line containing `marker`.
pub fn first_line_containing<'a, S: AsRef<str>>(lines: &'a [S], marker: &str) -> Result<&'a str> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .find(|line| line.contains(marker))
        .ok_or_else(|| ExtractionError::anchor(marker))
}

/// Index of the first line containing `marker`.
pub fn first_index_containing<S: AsRef<str>>(lines: &[S], marker: &str) -> Result<usize> {
    lines
        .iter()
        .position(|line| line.as_ref().contains(marker))
        .ok_or_else(|| ExtractionError::anchor(marker))
}

/// Line `offset` positions after (or before, if negative) the anchor line.
pub fn line_relative<'a, S: AsRef<str>>(
    lines: &'a [S],
    marker: &str,
    offset: isize,
) -> Result<&'a str> {
    let anchor = first_index_containing(lines, marker)?;

    anchor
        .checked_add_signed(offset)
        .and_then(|idx| lines.get(idx))
        .map(|line| line.as_ref())
        .ok_or_else(|| ExtractionError::LineOutOfRange {
            marker: marker.to_string(),
            offset,
        })
}

/// Split a line into tokens at single spaces.
pub fn tokens(line: &str) -> Vec<&str> {
    line.split(' ').collect()
}

/// Token `index` of `line`; `marker` names the anchor in the error.
pub fn token<'a>(line: &'a str, index: usize, marker: &str) -> Result<&'a str> {
    line.split(' ')
        .nth(index)
        .ok_or_else(|| ExtractionError::token(marker, index))
}

/// Token `index` counted from the end of `line` (1 is the last token).
pub fn token_from_end<'a>(line: &'a str, index: usize, marker: &str) -> Result<&'a str> {
    if index == 0 {
        return Err(ExtractionError::token(marker, index));
    }
    line.split(' ')
        .nth_back(index - 1)
        .ok_or_else(|| ExtractionError::token(marker, index))
}

/// All tokens from `start` onwards, joined with single spaces.
pub fn tokens_from(line: &str, start: usize) -> String {
    line.split(' ').skip(start).collect::<Vec<_>>().join(" ")
}

/// Non-blank lines strictly between the first line containing `start` and
/// the first line containing `end`.
///
/// Empty when the end anchor precedes the start anchor.
pub fn lines_between<'a, S: AsRef<str>>(
    lines: &'a [S],
    start: &str,
    end: &str,
) -> Result<Vec<&'a str>> {
    let from = first_index_containing(lines, start)? + 1;
    let to = first_index_containing(lines, end)?;

    Ok(lines
        .get(from..to)
        .unwrap_or_default()
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| !line.trim().is_empty())
        .collect())
}

/// Whether `marker` occurs anywhere inside a bounded range of lines.
///
/// Lines are concatenated without separator before the check.
pub fn region_contains<S: AsRef<str>>(region: &[S], marker: &str) -> bool {
    region
        .iter()
        .map(|line| line.as_ref())
        .collect::<String>()
        .contains(marker)
}

/// How a field is derived from its anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Token at a fixed index of the anchor line.
    Token(usize),
    /// Token counted from the end of the anchor line (1 is the last token).
    TokenFromEnd(usize),
    /// All tokens from a fixed index onwards.
    TokensFrom(usize),
    /// The whole line at a fixed offset from the anchor line.
    LineRelative(isize),
}

/// A marker phrase paired with its extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorField {
    pub marker: &'static str,
    pub rule: FieldRule,
}

impl AnchorField {
    pub const fn new(marker: &'static str, rule: FieldRule) -> Self {
        Self { marker, rule }
    }

    /// Extract the raw field text from `lines`.
    pub fn extract<'a, S: AsRef<str>>(&self, lines: &'a [S]) -> Result<Cow<'a, str>> {
        let marker = self.marker;
        match self.rule {
            FieldRule::Token(index) => {
                token(first_line_containing(lines, marker)?, index, marker).map(Cow::Borrowed)
            }
            FieldRule::TokenFromEnd(index) => {
                token_from_end(first_line_containing(lines, marker)?, index, marker)
                    .map(Cow::Borrowed)
            }
            FieldRule::TokensFrom(start) => Ok(Cow::Owned(tokens_from(
                first_line_containing(lines, marker)?,
                start,
            ))),
            FieldRule::LineRelative(offset) => {
                line_relative(lines, marker, offset).map(Cow::Borrowed)
            }
        }
    }
}
