//! Error types for the `tracegrid-grid` crate.

use tracegrid_types::{Coordinate, Extent, ExtentError};

/// Errors that can occur while writing to or rendering a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A write addressed a coordinate outside the extent.
    #[error("coordinate {coord} is outside the grid extent {extent}")]
    OutOfBounds {
        /// The rejected coordinate.
        coord: Coordinate,
        /// The grid extent.
        extent: Extent,
    },

    /// The extent itself is invalid.
    #[error(transparent)]
    Extent(#[from] ExtentError),

    /// A flat rendering selected a plane the grid does not have.
    #[error("plane {plane} is out of range; it must be in [0, {last}]")]
    PlaneOutOfRange {
        /// The requested plane.
        plane: usize,
        /// Highest valid plane index.
        last: usize,
    },

    /// Writing rendered output failed.
    #[error("failed to write snapshot: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
