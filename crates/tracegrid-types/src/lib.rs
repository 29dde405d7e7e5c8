//! Shared type definitions for the tracegrid trace-replay engine.
//!
//! Every crate in the workspace speaks in terms of these values: the
//! simulation clock, the scalar stored in each cell, and the coordinates
//! that address cells inside a fixed grid extent.
//!
//! # Modules
//!
//! - [`time`] -- [`SimTime`], the totally ordered simulation timestamp with
//!   an explicit infinity.
//! - [`value`] -- [`CellValue`], a real number or the undefined sentinel.
//! - [`coordinate`] -- [`Coordinate`] tuples, the [`Extent`] they live in,
//!   and the row-major enumeration over every cell.
//! - [`codec`] -- Textual `(d0,d1,...)` coordinates and row indices.

pub mod codec;
pub mod coordinate;
pub mod time;
pub mod value;

// Re-export all public types at crate root for convenience.
pub use codec::CodecError;
pub use coordinate::{Coordinate, Coordinates, Extent, ExtentError};
pub use time::{SimTime, TimeParseError};
pub use value::{CellValue, ValueParseError};
