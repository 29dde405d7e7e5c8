//! Replay engine for recorded cell-model event logs.
//!
//! A replay session reads one or more timestamp-ordered event logs, merges
//! them into a single timeline, applies every matching event to a
//! [`GridState`], and hands a snapshot of the grid to a [`SnapshotSink`]
//! at each requested show-time.
//!
//! # Architecture
//!
//! ```text
//! LineSource --> StreamCursor --+
//! LineSource --> StreamCursor --+--> MergeFrontier --> ReplayDriver --> SnapshotSink
//! LineSource --> StreamCursor --+         |
//!                                     GridState
//! ```
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides.
//! - [`cursor`] -- [`StreamCursor`], the pending event of one log source.
//! - [`driver`] -- [`ReplayDriver`], the accumulate/snapshot state machine.
//! - [`error`] -- Fatal replay errors.
//! - [`event`] -- Event record parsing and model/port filtering.
//! - [`frontier`] -- [`MergeFrontier`], the ordered merge across cursors.
//! - [`session`] -- Assembly of a complete session from configuration.
//! - [`sink`] -- Snapshot consumers and the text/JSON writer.
//! - [`source`] -- The [`LineSource`] capability and its file/stdin forms.
//!
//! [`GridState`]: tracegrid_grid::GridState

pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod event;
pub mod frontier;
pub mod session;
pub mod sink;
pub mod source;

// Re-export primary types at crate root.
pub use config::{ConfigError, OutputMode, ReplayConfig};
pub use cursor::StreamCursor;
pub use driver::{DriverState, ReplayDriver, ReplaySummary};
pub use error::ReplayError;
pub use event::{CellEvent, EventFilter, parse_event_line};
pub use frontier::MergeFrontier;
pub use session::{LogPlan, ReplaySession};
pub use sink::{RenderMode, Snapshot, SnapshotSink, WriterSink};
pub use source::{LineSource, ReaderSource};
