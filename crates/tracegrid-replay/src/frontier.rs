//! Ordered merge across stream cursors.
//!
//! Each log is ordered by time on its own; the frontier interleaves them
//! without sorting anything. At every step it takes the minimum pending
//! time over all cursors, applies every event pending at exactly that
//! time (in registration order), advances those cursors and looks again.

use tracegrid_grid::GridState;
use tracegrid_types::SimTime;
use tracing::trace;

use crate::cursor::StreamCursor;
use crate::error::ReplayError;

/// The set of cursors being merged and the current processed time.
#[derive(Debug)]
pub struct MergeFrontier {
    cursors: Vec<StreamCursor>,
    current: SimTime,
    applied: u64,
}

impl MergeFrontier {
    /// Merge `cursors` in the given registration order.
    pub const fn new(cursors: Vec<StreamCursor>) -> Self {
        Self {
            cursors,
            current: SimTime::ZERO,
            applied: 0,
        }
    }

    /// Earliest pending time across all cursors; infinity once every
    /// cursor is exhausted.
    pub fn min_pending_time(&self) -> SimTime {
        self.cursors
            .iter()
            .map(StreamCursor::pending_time)
            .min()
            .unwrap_or(SimTime::INFINITY)
    }

    /// Time of the most recently applied events.
    pub const fn current_time(&self) -> SimTime {
        self.current
    }

    /// Events applied since construction.
    pub const fn applied(&self) -> u64 {
        self.applied
    }

    /// The merged cursors, in registration order.
    pub fn cursors(&self) -> &[StreamCursor] {
        &self.cursors
    }

    /// Apply, in time order, every pending event no later than `target`.
    ///
    /// Returns the number of events applied by this call.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::TimeRegression`] if a stream's next event is
    /// earlier than the current time, [`ReplayError::Apply`] if an event
    /// addresses a cell outside the grid, or a read error from a cursor.
    pub fn step_to(&mut self, target: SimTime, grid: &mut GridState) -> Result<u64, ReplayError> {
        let mut applied: u64 = 0;

        loop {
            let next = self.min_pending_time();
            if next.is_infinite() || next > target {
                break;
            }
            if next < self.current {
                return Err(self.regression(next));
            }
            self.current = next;

            for cursor in &mut self.cursors {
                if cursor.pending_time() != next {
                    continue;
                }
                if let Some(event) = cursor.pending() {
                    grid.write(&event.coord, event.value)
                        .map_err(|source| ReplayError::Apply {
                            stream: cursor.name().to_owned(),
                            time: next,
                            source,
                        })?;
                    trace!(
                        stream = cursor.name(),
                        time = %next,
                        coord = %event.coord,
                        value = %event.value,
                        "event applied"
                    );
                    applied = applied.saturating_add(1);
                }
                cursor.advance()?;
            }
        }

        self.applied = self.applied.saturating_add(applied);
        Ok(applied)
    }

    fn regression(&self, pending: SimTime) -> ReplayError {
        let stream = self
            .cursors
            .iter()
            .find(|cursor| cursor.pending_time() == pending)
            .map(|cursor| cursor.name().to_owned())
            .unwrap_or_default();
        ReplayError::TimeRegression {
            stream,
            pending,
            current: self.current,
        }
    }
}
