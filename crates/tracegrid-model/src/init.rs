//! Initial grid state.
//!
//! A model populates its grid through one of these descriptor keys, read
//! in this fixed order:
//!
//! 1. `initialvalue` -- every cell set to one scalar.
//! 2. `initialrow` -- row index followed by one value per column, repeated.
//! 3. `initialrowvalue` -- row index followed by a digit string whose i-th
//!    character is column i (non-digits become undefined).
//! 4. `initialcellsvalue` -- a file of `(coord)=value` lines.
//! 5. `initialmapvalue` -- a file with one value per line for every cell,
//!    in enumeration order.
//!
//! Keys 2 and 3 are the two encodings of the sparse explicit row list and
//! only apply to planar grids. A model should carry exactly one directive.
//! When several are present they are all applied in the order above, each
//! overwriting earlier values where coordinates coincide, and a warning is
//! logged.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracegrid_grid::GridState;
use tracegrid_types::{CellValue, Coordinate, Extent, codec};
use tracing::{debug, warn};

use crate::descriptor::{self, ModelDescriptor};
use crate::error::ModelError;

const UNIFORM_KEY: &str = "initialvalue";
const ROW_VALUES_KEY: &str = "initialrow";
const ROW_DIGITS_KEY: &str = "initialrowvalue";
const CELLS_FILE_KEY: &str = "initialcellsvalue";
const MAP_FILE_KEY: &str = "initialmapvalue";

/// How a sparse explicit row list encodes each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEncoding {
    /// One value token per column (`initialrow`).
    Values,
    /// A single digit string per row (`initialrowvalue`).
    Digits,
}

/// One initial-state directive from the model descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum InitDirective {
    /// Every cell set to one value.
    Uniform(CellValue),
    /// A sparse explicit list of rows.
    Rows {
        /// How each row is encoded.
        encoding: RowEncoding,
        /// The raw token list, row indices included.
        tokens: Vec<String>,
    },
    /// A sparse file of `(coord)=value` lines.
    CellsFile(PathBuf),
    /// A dense file with one value per cell in enumeration order.
    MapFile(PathBuf),
}

impl InitDirective {
    /// The descriptor key this directive was read from.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Uniform(_) => UNIFORM_KEY,
            Self::Rows {
                encoding: RowEncoding::Values,
                ..
            } => ROW_VALUES_KEY,
            Self::Rows {
                encoding: RowEncoding::Digits,
                ..
            } => ROW_DIGITS_KEY,
            Self::CellsFile(_) => CELLS_FILE_KEY,
            Self::MapFile(_) => MAP_FILE_KEY,
        }
    }

    /// Apply this directive to `grid`.
    ///
    /// # Errors
    ///
    /// Returns the [`ModelError`] matching the directive's failure mode;
    /// cells written before the failure keep their new values.
    pub fn apply(&self, grid: &mut GridState) -> Result<(), ModelError> {
        match self {
            Self::Uniform(value) => {
                grid.fill(*value);
                Ok(())
            }
            Self::Rows {
                encoding: RowEncoding::Values,
                tokens,
            } => apply_row_values(grid, tokens),
            Self::Rows {
                encoding: RowEncoding::Digits,
                tokens,
            } => apply_row_digits(grid, tokens),
            Self::CellsFile(path) => load_cells_file(grid, path),
            Self::MapFile(path) => load_map_file(grid, path),
        }
    }
}

/// The initial-state directives of one model, in application order.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    directives: Vec<InitDirective>,
}

impl InitialState {
    /// Collect the directives `model` defines.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingInitialState`] if none is present and
    /// [`ModelError::InvalidValue`] if `initialvalue` is not a value.
    pub fn from_descriptor(desc: &dyn ModelDescriptor, model: &str) -> Result<Self, ModelError> {
        let mut directives = Vec::new();

        if let Some(token) = desc.first(model, UNIFORM_KEY) {
            let value = token.parse().map_err(|source| ModelError::InvalidValue {
                context: format!("{UNIFORM_KEY} of model '{model}'"),
                source,
            })?;
            directives.push(InitDirective::Uniform(value));
        }
        for (key, encoding) in [
            (ROW_VALUES_KEY, RowEncoding::Values),
            (ROW_DIGITS_KEY, RowEncoding::Digits),
        ] {
            if let Some(tokens) = desc.definition(model, key) {
                directives.push(InitDirective::Rows {
                    encoding,
                    tokens: tokens.to_vec(),
                });
            }
        }
        if let Some(reference) = desc.first(model, CELLS_FILE_KEY) {
            directives.push(InitDirective::CellsFile(descriptor::resolve_path(
                desc, reference,
            )));
        }
        if let Some(reference) = desc.first(model, MAP_FILE_KEY) {
            directives.push(InitDirective::MapFile(descriptor::resolve_path(
                desc, reference,
            )));
        }

        if directives.is_empty() {
            return Err(ModelError::MissingInitialState {
                model: model.to_owned(),
            });
        }
        if directives.len() > 1 {
            let keys: Vec<&str> = directives.iter().map(InitDirective::key).collect();
            warn!(
                model,
                directives = ?keys,
                "several initial-state directives present; later ones overwrite earlier ones"
            );
        }

        Ok(Self { directives })
    }

    /// Build an initial state from explicit directives.
    pub const fn from_directives(directives: Vec<InitDirective>) -> Self {
        Self { directives }
    }

    /// The directives in application order.
    pub fn directives(&self) -> &[InitDirective] {
        &self.directives
    }

    /// Value every cell starts with before directives are applied.
    ///
    /// This is the uniform value if one is given, otherwise undefined.
    pub fn default_value(&self) -> CellValue {
        self.directives
            .iter()
            .find_map(|d| match d {
                InitDirective::Uniform(v) => Some(*v),
                _ => None,
            })
            .unwrap_or(CellValue::Undefined)
    }

    /// Create a grid of `extent` and apply every directive to it.
    ///
    /// # Errors
    ///
    /// Propagates the first directive failure.
    pub fn build(&self, extent: Extent) -> Result<GridState, ModelError> {
        let mut grid = GridState::new(extent, self.default_value());
        for directive in &self.directives {
            directive.apply(&mut grid)?;
            debug!(directive = directive.key(), "applied initial-state directive");
        }
        Ok(grid)
    }
}

/// Parse one line of a sparse initial-cell file.
///
/// Whitespace is ignored. Returns `None` for lines that do not read as
/// `(coord)=value`.
pub fn parse_cell_line(line: &str) -> Option<(Coordinate, CellValue)> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let (position, value) = compact.split_once('=')?;
    if !position.starts_with('(') || value.is_empty() {
        return None;
    }
    let coord = codec::parse_coordinate(position).ok()?;
    let value = value.parse().ok()?;
    Some((coord, value))
}

/// Write every cell of `grid` as `(coord)=value` lines.
///
/// The output reloads through `initialcellsvalue` to the same state.
///
/// # Errors
///
/// Returns any I/O error from `out`.
pub fn write_cell_lines<W: Write>(grid: &GridState, out: &mut W) -> std::io::Result<()> {
    for (coord, value) in grid.iter() {
        writeln!(out, "{coord}={value}")?;
    }
    Ok(())
}

fn require_planar(grid: &GridState, key: &'static str) -> Result<(usize, usize), ModelError> {
    let extent = grid.extent();
    if extent.rank() != 2 {
        return Err(ModelError::NotPlanar {
            key,
            rank: extent.rank(),
        });
    }
    Ok((extent.rows(), extent.cols()))
}

fn checked_row(token: &str, rows: usize, key: &'static str) -> Result<usize, ModelError> {
    let row = codec::parse_row_index(token)?;
    if row >= rows {
        return Err(ModelError::RowOutOfRange {
            key,
            row,
            last: rows.saturating_sub(1),
        });
    }
    Ok(row)
}

fn apply_row_values(grid: &mut GridState, tokens: &[String]) -> Result<(), ModelError> {
    let (rows, cols) = require_planar(grid, ROW_VALUES_KEY)?;
    let mut cursor = tokens.iter();

    while let Some(row_token) = cursor.next() {
        let row = checked_row(row_token, rows, ROW_VALUES_KEY)?;
        for col in 0..cols {
            let token = cursor.next().ok_or(ModelError::InsufficientRowData {
                row,
                found: col,
                expected: cols,
            })?;
            let value = token.parse().map_err(|source| ModelError::InvalidValue {
                context: format!("{ROW_VALUES_KEY} row {row} column {col}"),
                source,
            })?;
            grid.write(&Coordinate::planar(row, col), value)?;
        }
    }
    Ok(())
}

fn apply_row_digits(grid: &mut GridState, tokens: &[String]) -> Result<(), ModelError> {
    let (rows, cols) = require_planar(grid, ROW_DIGITS_KEY)?;
    let mut cursor = tokens.iter();

    while let Some(row_token) = cursor.next() {
        let row = checked_row(row_token, rows, ROW_DIGITS_KEY)?;
        let digits = cursor.next().ok_or(ModelError::MissingRowString { row })?;
        let found = digits.chars().count();
        if found != cols {
            return Err(ModelError::RowWidthMismatch {
                row,
                found,
                expected: cols,
            });
        }
        for (col, c) in digits.chars().enumerate() {
            grid.write(&Coordinate::planar(row, col), CellValue::from_digit(c))?;
        }
    }
    Ok(())
}

fn read_initial_file(path: &Path, key: &str) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        context: format!("defined by the {key} clause"),
        source,
    })
}

fn load_cells_file(grid: &mut GridState, path: &Path) -> Result<(), ModelError> {
    let text = read_initial_file(path, CELLS_FILE_KEY)?;
    let mut applied: u64 = 0;
    let mut skipped: u64 = 0;

    for line in text.lines() {
        match parse_cell_line(line) {
            Some((coord, value)) => {
                grid.write(&coord, value)?;
                applied = applied.saturating_add(1);
            }
            None => skipped = skipped.saturating_add(1),
        }
    }

    debug!(
        path = %path.display(),
        applied,
        skipped,
        "loaded sparse initial cells"
    );
    Ok(())
}

fn load_map_file(grid: &mut GridState, path: &Path) -> Result<(), ModelError> {
    let text = read_initial_file(path, MAP_FILE_KEY)?;
    let extent = grid.extent().clone();
    let mut lines = text.lines();

    for (index, coord) in extent.coordinates().enumerate() {
        let line = lines.next().ok_or_else(|| ModelError::InsufficientMapData {
            path: path.to_path_buf(),
            found: index,
            expected: extent.cell_count(),
        })?;
        let value = line.parse().map_err(|source| ModelError::InvalidValue {
            context: format!("{MAP_FILE_KEY} '{}' line {}", path.display(), index.saturating_add(1)),
            source,
        })?;
        grid.write(&coord, value)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use tracegrid_grid::GridError;

    use super::*;
    use crate::descriptor::MaFile;

    fn planar(rows: usize, cols: usize) -> Extent {
        Extent::planar(rows, cols).unwrap()
    }

    fn build(ma: &str, extent: Extent) -> Result<GridState, ModelError> {
        let desc = MaFile::parse(ma);
        InitialState::from_descriptor(&desc, "m")?.build(extent)
    }

    fn value_at(grid: &GridState, row: usize, col: usize) -> CellValue {
        grid.read(&Coordinate::planar(row, col))
    }

    #[test]
    fn uniform_fill() {
        let grid = build("[m]\ninitialvalue : 2.5\n", planar(2, 2)).unwrap();
        assert!(grid.values().iter().all(|v| *v == CellValue::Defined(2.5)));
    }

    #[test]
    fn no_directive_is_fatal() {
        let err = build("[m]\nwidth : 2\n", planar(2, 2)).unwrap_err();
        assert!(matches!(err, ModelError::MissingInitialState { .. }));
    }

    #[test]
    fn explicit_rows_overwrite_uniform() {
        let grid = build(
            "[m]\ninitialvalue : 0\ninitialrow : 1 5 6 7\ninitialrow : 0 1 ? 3\n",
            planar(2, 3),
        )
        .unwrap();
        assert_eq!(value_at(&grid, 1, 2), CellValue::Defined(7.0));
        assert_eq!(value_at(&grid, 0, 0), CellValue::Defined(1.0));
        assert!(value_at(&grid, 0, 1).is_undefined());
    }

    #[test]
    fn explicit_row_out_of_range() {
        let err = build("[m]\ninitialrow : 2 1 1\n", planar(2, 2)).unwrap_err();
        assert!(matches!(err, ModelError::RowOutOfRange { row: 2, last: 1, .. }));
        assert!(err.to_string().contains("[0, 1]"));
    }

    #[test]
    fn explicit_row_too_short() {
        let err = build("[m]\ninitialrow : 0 1 2 1 4\n", planar(2, 3)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InsufficientRowData {
                row: 1,
                found: 1,
                expected: 3
            }
        ));
    }

    #[test]
    fn digit_rows_decode_characters() {
        let grid = build("[m]\ninitialrowvalue : 1 0x9\n", planar(2, 3)).unwrap();
        assert_eq!(value_at(&grid, 1, 0), CellValue::Defined(0.0));
        assert!(value_at(&grid, 1, 1).is_undefined());
        assert_eq!(value_at(&grid, 1, 2), CellValue::Defined(9.0));
        // No uniform directive: untouched cells are undefined.
        assert!(value_at(&grid, 0, 0).is_undefined());
    }

    #[test]
    fn digit_row_width_must_match() {
        let err = build("[m]\ninitialrowvalue : 0 12\n", planar(1, 3)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::RowWidthMismatch {
                row: 0,
                found: 2,
                expected: 3
            }
        ));
        let err = build("[m]\ninitialrowvalue : 0\n", planar(1, 3)).unwrap_err();
        assert!(matches!(err, ModelError::MissingRowString { row: 0 }));
    }

    #[test]
    fn row_directives_need_planar_grid() {
        let err = build(
            "[m]\ninitialrowvalue : 0 12\n",
            Extent::new(vec![2, 2, 2]).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::NotPlanar { rank: 3, .. }));
    }

    #[test]
    fn cell_lines_parse_and_skip() {
        assert_eq!(
            parse_cell_line(" ( 1 , 2 ) = 3.5 "),
            Some((Coordinate::planar(1, 2), CellValue::Defined(3.5)))
        );
        assert_eq!(parse_cell_line("(0,0)=?"), Some((Coordinate::planar(0, 0), CellValue::Undefined)));
        for bad in ["", "garbage", "(0,0)=", "1,1=3", "(a,b)=1", "(0,0)=x"] {
            assert_eq!(parse_cell_line(bad), None, "accepted {bad:?}");
        }
    }

    #[test]
    fn cells_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = GridState::new(planar(3, 4), CellValue::Defined(0.0));
        let _ = source.write(&Coordinate::planar(0, 3), CellValue::Defined(1.25));
        let _ = source.write(&Coordinate::planar(2, 1), CellValue::Undefined);
        let _ = source.write(&Coordinate::planar(1, 1), CellValue::Defined(-4.0));

        let mut text = Vec::new();
        write_cell_lines(&source, &mut text).unwrap();
        text.extend_from_slice(b"this line is not a cell\n");
        fs::write(dir.path().join("cells.val"), &text).unwrap();

        let ma_path = dir.path().join("m.ma");
        fs::write(&ma_path, "[m]\ninitialcellsvalue : cells.val\n").unwrap();
        let desc = MaFile::from_file(&ma_path).unwrap();
        let reloaded = InitialState::from_descriptor(&desc, "m")
            .unwrap()
            .build(planar(3, 4))
            .unwrap();

        assert_eq!(reloaded.values(), source.values());
        assert!(reloaded.default_value().is_undefined());
    }

    #[test]
    fn cells_file_out_of_bounds_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.val");
        fs::write(&path, "(5,5)=1\n").unwrap();
        let state = InitialState::from_directives(vec![InitDirective::CellsFile(path)]);
        let err = state.build(planar(2, 2)).unwrap_err();
        assert!(matches!(err, ModelError::Grid(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn missing_initial_file_is_fatal() {
        let state = InitialState::from_directives(vec![InitDirective::MapFile(
            PathBuf::from("/nonexistent/map.val"),
        )]);
        let err = state.build(planar(1, 1)).unwrap_err();
        assert!(err.to_string().contains("initialmapvalue"));
    }

    #[test]
    fn map_file_fills_in_enumeration_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.val");
        fs::write(&path, "1\n2\n3\n4\n5\n6\nextra\n").unwrap();
        let state = InitialState::from_directives(vec![InitDirective::MapFile(path)]);
        let grid = state.build(planar(2, 3)).unwrap();
        assert_eq!(value_at(&grid, 0, 2), CellValue::Defined(3.0));
        assert_eq!(value_at(&grid, 1, 0), CellValue::Defined(4.0));
    }

    #[test]
    fn short_map_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.val");
        fs::write(&path, "1\n2\n3\n").unwrap();
        let state = InitialState::from_directives(vec![InitDirective::MapFile(path)]);
        let err = state.build(planar(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InsufficientMapData {
                found: 3,
                expected: 4,
                ..
            }
        ));
    }

    #[test]
    fn directive_order_is_fixed() {
        let desc = MaFile::parse(
            "[m]\ninitialmapvalue : a.val\ninitialrowvalue : 0 1\ninitialvalue : 1\n",
        );
        let state = InitialState::from_descriptor(&desc, "m").unwrap();
        let keys: Vec<&str> = state.directives().iter().map(InitDirective::key).collect();
        assert_eq!(keys, ["initialvalue", "initialrowvalue", "initialmapvalue"]);
        assert_eq!(state.default_value(), CellValue::Defined(1.0));
    }
}
