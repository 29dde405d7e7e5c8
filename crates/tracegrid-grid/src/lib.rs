//! Grid state and snapshot rendering for the tracegrid replay engine.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid writes and rendering.
//! - [`state`] -- [`GridState`], the dense store holding one value per
//!   coordinate of a fixed extent.
//! - [`render`] -- Text rendering of a [`GridState`] under an explicit
//!   [`FormatPolicy`].

pub mod error;
pub mod render;
pub mod state;

// Re-export primary types at crate root.
pub use error::GridError;
pub use render::{FormatPolicy, render_flat, render_framed};
pub use state::GridState;
