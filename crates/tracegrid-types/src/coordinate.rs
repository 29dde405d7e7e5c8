//! Coordinates and the fixed grid extent they address.
//!
//! An [`Extent`] is an ordered tuple of positive dimension sizes; the first
//! component is the row count and the second the column count for planar
//! grids. A [`Coordinate`] has one non-negative component per dimension.
//!
//! Cells are enumerated row-major: the last dimension varies fastest. The
//! same order maps a coordinate to its dense offset, so iterating
//! [`Extent::coordinates`] visits offsets `0, 1, 2, ...`.

use core::fmt;
use core::iter::FusedIterator;

use serde::Serialize;

/// Errors raised when constructing an [`Extent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtentError {
    /// No dimensions were given.
    #[error("a grid needs at least one dimension")]
    Empty,

    /// A dimension has size zero.
    #[error("dimension {axis} of extent {extent} is 0; every dimension must be at least 1")]
    ZeroDimension {
        /// Index of the offending dimension.
        axis: usize,
        /// The full extent as written, e.g. `(0,20)`.
        extent: String,
    },

    /// The total cell count does not fit in memory addressing.
    #[error("extent {extent} has too many cells")]
    TooLarge {
        /// The full extent as written.
        extent: String,
    },
}

/// A cell address: one component per grid dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coordinate(Vec<usize>);

impl Coordinate {
    /// Create a coordinate from its components.
    pub const fn new(components: Vec<usize>) -> Self {
        Self(components)
    }

    /// Create a 2-D `(row, col)` coordinate.
    pub fn planar(row: usize, col: usize) -> Self {
        Self(vec![row, col])
    }

    /// The components in dimension order.
    pub fn components(&self) -> &[usize] {
        &self.0
    }

    /// Number of components.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// The component along `axis`, if the coordinate has one.
    pub fn get(&self, axis: usize) -> Option<usize> {
        self.0.get(axis).copied()
    }
}

impl From<Vec<usize>> for Coordinate {
    fn from(components: Vec<usize>) -> Self {
        Self(components)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str(")")
    }
}

/// The fixed N-dimensional size of a grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Extent {
    /// Size of each dimension, all at least 1.
    dims: Vec<usize>,
    /// Product of `dims`.
    #[serde(skip)]
    cell_count: usize,
}

impl Extent {
    /// Create an extent from its dimension sizes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtentError::Empty`] for an empty tuple,
    /// [`ExtentError::ZeroDimension`] if any size is zero, and
    /// [`ExtentError::TooLarge`] if the cell count overflows.
    pub fn new(dims: Vec<usize>) -> Result<Self, ExtentError> {
        if dims.is_empty() {
            return Err(ExtentError::Empty);
        }
        if let Some(axis) = dims.iter().position(|&d| d == 0) {
            return Err(ExtentError::ZeroDimension {
                axis,
                extent: Coordinate::new(dims).to_string(),
            });
        }
        let cell_count = dims
            .iter()
            .try_fold(1_usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| ExtentError::TooLarge {
                extent: Coordinate::new(dims.clone()).to_string(),
            })?;
        Ok(Self { dims, cell_count })
    }

    /// Create a 2-D extent of `rows` by `cols`.
    ///
    /// # Errors
    ///
    /// Same as [`Extent::new`].
    pub fn planar(rows: usize, cols: usize) -> Result<Self, ExtentError> {
        Self::new(vec![rows, cols])
    }

    /// Dimension sizes in order.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Size of the first dimension.
    pub fn rows(&self) -> usize {
        self.dims.first().copied().unwrap_or(1)
    }

    /// Size of the second dimension (1 for one-dimensional grids).
    pub fn cols(&self) -> usize {
        self.dims.get(1).copied().unwrap_or(1)
    }

    /// Whether `coord` has the right rank and lies inside every dimension.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.rank() == self.rank()
            && coord
                .components()
                .iter()
                .zip(&self.dims)
                .all(|(c, d)| c < d)
    }

    /// Dense row-major offset of `coord`, or `None` when out of bounds.
    pub fn offset(&self, coord: &Coordinate) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        coord
            .components()
            .iter()
            .zip(&self.dims)
            .try_fold(0_usize, |acc, (&c, &d)| acc.checked_mul(d)?.checked_add(c))
    }

    /// Every coordinate of the extent in enumeration order.
    ///
    /// The sequence is finite and lazy; call again to restart it.
    pub fn coordinates(&self) -> Coordinates<'_> {
        Coordinates {
            dims: &self.dims,
            next: Some(vec![0; self.dims.len()]),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.dims.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("x"))
    }
}

/// Row-major iterator over the coordinates of an [`Extent`].
#[derive(Debug, Clone)]
pub struct Coordinates<'a> {
    dims: &'a [usize],
    next: Option<Vec<usize>>,
}

impl Iterator for Coordinates<'_> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut successor = current.clone();
        let mut wrapped = true;
        for (component, &size) in successor.iter_mut().zip(self.dims).rev() {
            let bumped = component.saturating_add(1);
            if bumped < size {
                *component = bumped;
                wrapped = false;
                break;
            }
            *component = 0;
        }
        if !wrapped {
            self.next = Some(successor);
        }
        Some(Coordinate(current))
    }
}

impl FusedIterator for Coordinates<'_> {}
