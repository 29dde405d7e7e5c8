//! Snapshot output.
//!
//! The driver hands every snapshot to a [`SnapshotSink`]. [`WriterSink`]
//! is the standard one: it renders to any [`Write`] in one of three
//! layouts.
//!
//! - **Framed**: `Line : <n> - Time: <t>` followed by the framed grid.
//! - **Flat**: a blank line followed by bare cell rows; grids of rank
//!   three or more print one plane of the third dimension.
//! - **Json**: one object per line with the snapshot number, time, extent
//!   and every cell in enumeration order (`null` for undefined).

use std::io::Write;

use serde::Serialize;
use tracegrid_grid::{FormatPolicy, GridState, render};
use tracegrid_types::{CellValue, SimTime};

use crate::error::ReplayError;

/// The grid as of one show-time.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// Snapshot number, counting from 1.
    pub line: u64,
    /// The show-time the grid reflects.
    pub time: SimTime,
    /// The replayed grid.
    pub grid: &'a GridState,
}

/// Receives each snapshot the driver emits.
pub trait SnapshotSink {
    /// Consume one snapshot.
    ///
    /// # Errors
    ///
    /// Any error aborts the replay.
    fn emit(&mut self, snapshot: &Snapshot<'_>) -> Result<(), ReplayError>;
}

/// Layout used by [`WriterSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Labelled snapshots with borders.
    #[default]
    Framed,
    /// Unlabelled bare rows.
    Flat {
        /// Index along the third dimension for grids of rank three or more.
        plane: usize,
    },
    /// One JSON object per snapshot.
    Json,
}

#[derive(Serialize)]
struct JsonSnapshot<'a> {
    line: u64,
    time: SimTime,
    extent: &'a [usize],
    cells: &'a [CellValue],
}

/// Writes rendered snapshots to `W`.
#[derive(Debug)]
pub struct WriterSink<W> {
    out: W,
    policy: FormatPolicy,
    mode: RenderMode,
}

impl<W: Write> WriterSink<W> {
    /// Render into `out` with the given cell policy and layout.
    pub const fn new(out: W, policy: FormatPolicy, mode: RenderMode) -> Self {
        Self { out, policy, mode }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SnapshotSink for WriterSink<W> {
    fn emit(&mut self, snapshot: &Snapshot<'_>) -> Result<(), ReplayError> {
        match self.mode {
            RenderMode::Framed => {
                writeln!(self.out, "Line : {} - Time: {}", snapshot.line, snapshot.time)?;
                render::render_framed(snapshot.grid, &self.policy, &mut self.out)?;
            }
            RenderMode::Flat { plane } => {
                writeln!(self.out)?;
                render::render_flat(snapshot.grid, &self.policy, plane, &mut self.out)?;
            }
            RenderMode::Json => {
                let record = JsonSnapshot {
                    line: snapshot.line,
                    time: snapshot.time,
                    extent: snapshot.grid.extent().dims(),
                    cells: snapshot.grid.values(),
                };
                serde_json::to_writer(&mut self.out, &record)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
