//! Error types for the `tracegrid-model` crate.
//!
//! Every variant is fatal for a replay session: the grid cannot be built
//! or initialized. Messages name the offending value and, where one
//! exists, the valid range.

use std::path::PathBuf;

use tracegrid_grid::GridError;
use tracegrid_types::{CodecError, ExtentError, ValueParseError};

/// Errors that can occur while reading a descriptor or loading initial state.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A descriptor or initial-state file could not be read.
    #[error("can't open the file '{}' {context}: {source}", path.display())]
    Io {
        /// The file that failed to open.
        path: PathBuf,
        /// Which clause or role referenced the file.
        context: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Neither `width` nor `dim` is defined for the model.
    #[error("model '{model}' defines neither 'width' nor 'dim'")]
    MissingDimension {
        /// The model name.
        model: String,
    },

    /// A key required by another key is missing.
    #[error("model '{model}' is missing the '{key}' key")]
    MissingKey {
        /// The model name.
        model: String,
        /// The missing key.
        key: String,
    },

    /// A dimension token is not a non-negative integer.
    #[error("model '{model}': invalid value '{value}' for '{key}'")]
    InvalidDimension {
        /// The model name.
        model: String,
        /// The key holding the value.
        key: String,
        /// The rejected token.
        value: String,
    },

    /// The extent has a zero component or is otherwise unusable.
    #[error("attempt to draw model '{model}' with an invalid extent: {source}")]
    Extent {
        /// The model name.
        model: String,
        /// The underlying extent error.
        source: ExtentError,
    },

    /// A non-default port was requested but the model declares none.
    #[error("port '{port}' requested but model '{model}' has no neighborports keyword")]
    NoNeighborPorts {
        /// The requested port.
        port: String,
        /// The model name.
        model: String,
    },

    /// A non-default port was requested that the model does not declare.
    #[error("port '{port}' not declared in the neighborports of model '{model}'")]
    UndeclaredPort {
        /// The requested port.
        port: String,
        /// The model name.
        model: String,
    },

    /// No initial-state directive is present.
    #[error(
        "model '{model}' has no initial state; expected one of initialvalue, initialrow, \
         initialrowvalue, initialcellsvalue or initialmapvalue"
    )]
    MissingInitialState {
        /// The model name.
        model: String,
    },

    /// A row-based directive was used on a grid that is not two-dimensional.
    #[error("'{key}' requires a 2-D grid but the extent has {rank} dimensions")]
    NotPlanar {
        /// The directive key.
        key: &'static str,
        /// The grid's rank.
        rank: usize,
    },

    /// A row index lies outside the grid.
    #[error("the row number for '{key}' is out of range. It's {row} and must be in [0, {last}]")]
    RowOutOfRange {
        /// The directive key.
        key: &'static str,
        /// The rejected row index.
        row: usize,
        /// Highest valid row index.
        last: usize,
    },

    /// An explicit row ran out of values.
    #[error(
        "insufficient data for initialrow: row {row} has {found} of {expected} values \
         (a middle row may be short)"
    )]
    InsufficientRowData {
        /// The short row.
        row: usize,
        /// Values found.
        found: usize,
        /// Values required (the column count).
        expected: usize,
    },

    /// A digit-string row index has no row string after it.
    #[error("invalid initialrowvalue: row {row} has no row string (must be pairs of rowNumber rowValues)")]
    MissingRowString {
        /// The row index without a string.
        row: usize,
    },

    /// A digit-string row does not match the column count.
    #[error("initialrowvalue row {row} has {found} characters but the width is {expected}")]
    RowWidthMismatch {
        /// The offending row.
        row: usize,
        /// Characters in the row string.
        found: usize,
        /// Required characters (the column count).
        expected: usize,
    },

    /// A token or line could not be read as a cell value.
    #[error("{context}: {source}")]
    InvalidValue {
        /// Where the value came from.
        context: String,
        /// The underlying parse error.
        source: ValueParseError,
    },

    /// A coordinate or row index did not parse.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The dense map file ended before every cell was covered.
    #[error("insufficient data in '{}' for initialmapvalue: found {found} of {expected} values", path.display())]
    InsufficientMapData {
        /// The map file.
        path: PathBuf,
        /// Lines read.
        found: usize,
        /// Cells in the grid.
        expected: usize,
    },

    /// Writing an initial value into the grid failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}
