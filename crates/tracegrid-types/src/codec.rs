//! Textual coordinate codec.
//!
//! Coordinates appear in descriptor files, sparse initial-cell files and
//! event logs as `(d0,d1,...)`, with optional spaces around components.
//! Row-encoded initial states name rows by a bare index token instead.
//!
//! Parsing never checks bounds; that happens when a value is written into
//! the grid.

use core::str::FromStr;

use crate::coordinate::Coordinate;

/// Errors produced when text does not match the coordinate syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The text is not a parenthesized, comma-separated tuple.
    #[error("invalid coordinate '{input}': {reason}")]
    Syntax {
        /// The rejected text.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A row index token is not a non-negative integer.
    #[error("invalid row index '{input}'")]
    RowIndex {
        /// The rejected token.
        input: String,
    },
}

/// Parse `(d0,d1,...)` into a [`Coordinate`].
///
/// # Errors
///
/// Returns [`CodecError::Syntax`] when parentheses are missing, the tuple
/// is empty, or a component is not a non-negative integer.
pub fn parse_coordinate(text: &str) -> Result<Coordinate, CodecError> {
    let syntax = |reason| CodecError::Syntax {
        input: text.to_owned(),
        reason,
    };

    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| syntax("expected '(' ... ')'"))?;

    if inner.trim().is_empty() {
        return Err(syntax("coordinate has no components"));
    }

    let components = inner
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<Result<Vec<usize>, _>>()
        .map_err(|_parse| syntax("components must be non-negative integers"))?;

    Ok(Coordinate::new(components))
}

/// Parse the row index token of a row-encoded initial state.
///
/// # Errors
///
/// Returns [`CodecError::RowIndex`] if the token is not a non-negative
/// integer.
pub fn parse_row_index(token: &str) -> Result<usize, CodecError> {
    token.trim().parse().map_err(|_parse| CodecError::RowIndex {
        input: token.to_owned(),
    })
}

impl FromStr for Coordinate {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_coordinate(s)
    }
}
