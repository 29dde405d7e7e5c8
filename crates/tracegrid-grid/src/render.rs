//! Text rendering of grid snapshots.
//!
//! The store holds no formatting state. Every rendering call receives a
//! [`FormatPolicy`] built once from configuration and passed down by
//! reference.
//!
//! Two layouts are provided:
//!
//! - **Framed**: column header, `+---+` borders and row labels. Grids with
//!   more than two dimensions print one framed plane per combination of
//!   the trailing indices.
//! - **Flat**: bare rows of cells. For grids with three or more dimensions
//!   only the selected plane of the third dimension is printed.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracegrid_types::{CellValue, Coordinate, Extent};

use crate::error::GridError;
use crate::state::GridState;

/// Width reserved for row labels in framed output.
const ROW_LABEL_WIDTH: usize = 3;

/// How each cell value is turned into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatPolicy {
    /// Characters reserved per cell; values are right-aligned.
    #[serde(default = "default_width")]
    pub width: usize,

    /// Digits after the decimal point.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Whether zero values are printed (blank cells otherwise).
    #[serde(default = "default_true")]
    pub print_zero: bool,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            width: default_width(),
            precision: default_precision(),
            print_zero: true,
        }
    }
}

impl FormatPolicy {
    /// Format one cell value to exactly `width` characters (or more, if
    /// the number does not fit).
    pub fn format_cell(&self, value: CellValue) -> String {
        let width = self.width;
        match value {
            CellValue::Undefined => format!("{:>width$}", "?"),
            CellValue::Defined(v) if !self.print_zero && v == 0.0 => " ".repeat(width),
            CellValue::Defined(v) => format!("{v:>width$.prec$}", prec = self.precision),
        }
    }
}

/// Render `grid` with header, borders and row labels.
///
/// # Errors
///
/// Returns [`GridError::Io`] if writing to `out` fails.
pub fn render_framed<W: Write>(
    grid: &GridState,
    policy: &FormatPolicy,
    out: &mut W,
) -> Result<(), GridError> {
    let extent = grid.extent();
    let cols = extent.cols();
    let border = format!(
        "{:width$}+{}+",
        "",
        "-".repeat(cols.saturating_mul(policy.width)),
        width = ROW_LABEL_WIDTH
    );

    for plane in planes(extent)? {
        if !plane.is_empty() {
            writeln!(out, "Plane {}", Coordinate::new(plane.clone()))?;
        }

        let mut header = " ".repeat(ROW_LABEL_WIDTH.saturating_add(1));
        for col in 0..cols {
            header.push_str(&format!("{col:>width$}", width = policy.width));
        }
        writeln!(out, "{header}")?;
        writeln!(out, "{border}")?;

        for row in 0..extent.rows() {
            write!(out, "{row:>width$}|", width = ROW_LABEL_WIDTH)?;
            write_row(grid, policy, row, &plane, out)?;
            writeln!(out, "|")?;
        }
        writeln!(out, "{border}")?;
    }
    Ok(())
}

/// Render `grid` as bare rows of cells.
///
/// For grids of rank three or more, `plane` selects the index along the
/// third dimension; it is ignored for planar grids.
///
/// # Errors
///
/// Returns [`GridError::PlaneOutOfRange`] if `plane` exceeds the third
/// dimension, or [`GridError::Io`] if writing fails.
pub fn render_flat<W: Write>(
    grid: &GridState,
    policy: &FormatPolicy,
    plane: usize,
    out: &mut W,
) -> Result<(), GridError> {
    let extent = grid.extent();
    check_plane(extent, plane)?;

    for trailing in planes(extent)? {
        if trailing.first().is_some_and(|&p| p != plane) {
            continue;
        }
        for row in 0..extent.rows() {
            write_row(grid, policy, row, &trailing, out)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Verify that `plane` is a valid index of the third dimension.
///
/// # Errors
///
/// Returns [`GridError::PlaneOutOfRange`] for grids of rank three or more
/// whose third dimension is not larger than `plane`.
pub fn check_plane(extent: &Extent, plane: usize) -> Result<(), GridError> {
    match extent.dims().get(2) {
        Some(&depth) if plane >= depth => Err(GridError::PlaneOutOfRange {
            plane,
            last: depth.saturating_sub(1),
        }),
        _ => Ok(()),
    }
}

/// Trailing index tuples (dimensions 2 and up) in enumeration order.
///
/// Planar and one-dimensional grids have a single, empty plane.
fn planes(extent: &Extent) -> Result<Vec<Vec<usize>>, GridError> {
    let trailing = extent.dims().get(2..).unwrap_or_default();
    if trailing.is_empty() {
        return Ok(vec![Vec::new()]);
    }
    let plane_extent = Extent::new(trailing.to_vec())?;
    Ok(plane_extent
        .coordinates()
        .map(|c| c.components().to_vec())
        .collect())
}

fn write_row<W: Write>(
    grid: &GridState,
    policy: &FormatPolicy,
    row: usize,
    plane: &[usize],
    out: &mut W,
) -> Result<(), GridError> {
    let extent = grid.extent();
    for col in 0..extent.cols() {
        let coord = cell_coordinate(extent.rank(), row, col, plane);
        write!(out, "{}", policy.format_cell(grid.read(&coord)))?;
    }
    Ok(())
}

fn cell_coordinate(rank: usize, row: usize, col: usize, plane: &[usize]) -> Coordinate {
    if rank == 1 {
        return Coordinate::new(vec![row]);
    }
    let mut components = Vec::with_capacity(rank);
    components.push(row);
    components.push(col);
    components.extend_from_slice(plane);
    Coordinate::new(components)
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_width() -> usize {
    8
}

const fn default_precision() -> usize {
    3
}

const fn default_true() -> bool {
    true
}
