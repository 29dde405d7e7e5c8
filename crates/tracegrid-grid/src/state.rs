//! Dense grid state: one scalar per coordinate of a fixed extent.
//!
//! The [`GridState`] is created once per replay session with every cell
//! set to a default value. It is never resized; the only mutation is a
//! coordinate-addressed [`write`](GridState::write), which checks bounds.
//!
//! Cells are stored contiguously in the extent's row-major enumeration
//! order, so [`GridState::iter`] yields coordinates and values in the
//! same order that dense initial-map files and renderers consume them.

use tracegrid_types::{CellValue, Coordinate, Coordinates, Extent};

use crate::error::GridError;

/// The replayed state of every cell in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    /// Fixed size of the grid.
    extent: Extent,
    /// Value every cell held at construction.
    default: CellValue,
    /// Cell values in enumeration order.
    cells: Vec<CellValue>,
}

impl GridState {
    /// Create a grid with every cell set to `default`.
    pub fn new(extent: Extent, default: CellValue) -> Self {
        let cells = vec![default; extent.cell_count()];
        Self {
            extent,
            default,
            cells,
        }
    }

    /// The fixed extent of the grid.
    pub const fn extent(&self) -> &Extent {
        &self.extent
    }

    /// The value cells held at construction.
    pub const fn default_value(&self) -> CellValue {
        self.default
    }

    /// Overwrite the value at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` has the wrong rank or
    /// lies outside the extent. The grid is left unchanged.
    pub fn write(&mut self, coord: &Coordinate, value: CellValue) -> Result<(), GridError> {
        let slot = self
            .extent
            .offset(coord)
            .and_then(|offset| self.cells.get_mut(offset))
            .ok_or_else(|| GridError::OutOfBounds {
                coord: coord.clone(),
                extent: self.extent.clone(),
            })?;
        *slot = value;
        Ok(())
    }

    /// The last value written at `coord`, or the construction default.
    ///
    /// Coordinates outside the extent also read as the default.
    pub fn read(&self, coord: &Coordinate) -> CellValue {
        self.extent
            .offset(coord)
            .and_then(|offset| self.cells.get(offset))
            .copied()
            .unwrap_or(self.default)
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: CellValue) {
        self.cells.fill(value);
    }

    /// Every coordinate in enumeration order.
    pub fn coordinates(&self) -> Coordinates<'_> {
        self.extent.coordinates()
    }

    /// Cell values in enumeration order.
    pub fn values(&self) -> &[CellValue] {
        &self.cells
    }

    /// Coordinates paired with their current values, in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, CellValue)> + '_ {
        self.extent.coordinates().zip(self.cells.iter().copied())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize, default: f64) -> GridState {
        GridState::new(Extent::planar(rows, cols).unwrap(), CellValue::Defined(default))
    }

    #[test]
    fn every_cell_reads_default_after_construction() {
        let extent = Extent::new(vec![3, 4, 2]).unwrap();
        let state = GridState::new(extent.clone(), CellValue::Defined(7.0));
        for coord in extent.coordinates() {
            assert_eq!(state.read(&coord), CellValue::Defined(7.0));
        }
        assert_eq!(state.values().len(), 24);
    }

    #[test]
    fn write_then_read() {
        let mut state = grid(3, 3, 0.0);
        let c = Coordinate::planar(2, 1);
        assert!(state.write(&c, CellValue::Defined(4.5)).is_ok());
        assert_eq!(state.read(&c), CellValue::Defined(4.5));
        assert_eq!(state.read(&Coordinate::planar(1, 2)), CellValue::Defined(0.0));
    }

    #[test]
    fn out_of_bounds_write_fails_and_leaves_state() {
        let mut state = grid(2, 2, 1.0);
        let before = state.clone();
        let err = state
            .write(&Coordinate::planar(2, 0), CellValue::Defined(9.0))
            .unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { .. }));
        assert!(err.to_string().contains("(2,0)"));
        assert_eq!(state, before);
    }

    #[test]
    fn wrong_rank_write_fails() {
        let mut state = grid(2, 2, 1.0);
        let result = state.write(&Coordinate::new(vec![0, 0, 0]), CellValue::Undefined);
        assert!(result.is_err());
    }

    #[test]
    fn iter_follows_enumeration_order() {
        let mut state = grid(2, 2, 0.0);
        let _ = state.write(&Coordinate::planar(1, 0), CellValue::Defined(3.0));
        let pairs: Vec<(String, CellValue)> =
            state.iter().map(|(c, v)| (c.to_string(), v)).collect();
        assert_eq!(pairs.get(2), Some(&("(1,0)".to_owned(), CellValue::Defined(3.0))));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn fill_overwrites_everything() {
        let mut state = grid(2, 3, 0.0);
        state.fill(CellValue::Undefined);
        assert!(state.values().iter().all(|v| v.is_undefined()));
        assert_eq!(state.default_value(), CellValue::Defined(0.0));
    }
}
