//! Model descriptors and initial grid state for the tracegrid replay engine.
//!
//! A model descriptor (`.ma` file) is a set of named sections, each mapping
//! keys to ordered token lists. The replay engine reads the cell model's
//! section to learn the grid extent, which output ports exist, and how the
//! grid is populated before the first event is applied.
//!
//! # Modules
//!
//! - [`descriptor`] -- The [`ModelDescriptor`] lookup trait and [`MaFile`],
//!   the concrete `.ma` reader.
//! - [`error`] -- Error types for descriptor and initial-state failures.
//! - [`extent`] -- Grid extent from `width`/`height` or `dim`.
//! - [`init`] -- The closed set of [`InitDirective`] variants and the
//!   loader that applies them to a [`GridState`].
//! - [`port`] -- Output port selection and validation against
//!   `neighborports`.
//!
//! [`GridState`]: tracegrid_grid::GridState

pub mod descriptor;
pub mod error;
pub mod extent;
pub mod init;
pub mod port;

// Re-export primary types at crate root.
pub use descriptor::{MaFile, ModelDescriptor};
pub use error::ModelError;
pub use extent::resolve_extent;
pub use init::{InitDirective, InitialState, RowEncoding};
pub use port::{OutputPort, resolve_port};
