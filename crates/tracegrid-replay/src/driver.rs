//! The replay state machine.
//!
//! ```text
//!            +--------------+   stepTo(show)   +----------+
//!  start --> | Accumulating | ---------------> | Snapshot |
//!            +--------------+                  +----------+
//!                   ^          next show-time     |    |
//!                   +-----------------------------+    | no pending events
//!                                                      v
//!                                                   +------+
//!                                                   | Done |
//!                                                   +------+
//! ```
//!
//! Each show-time gets exactly one snapshot reflecting every event at or
//! before it and none after. The first snapshot is emitted even when no
//! event precedes the initial show-time.
//!
//! With a fixed interval, show-times are `initial + k * interval`. Without
//! one, the next show-time is the time of the next pending event, so a
//! snapshot follows every distinct event time.

use serde::Serialize;
use tracegrid_grid::GridState;
use tracegrid_types::SimTime;
use tracing::{debug, info};

use crate::error::ReplayError;
use crate::frontier::MergeFrontier;
use crate::sink::{Snapshot, SnapshotSink};

/// Where the driver is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Applying events up to the current show-time.
    Accumulating,
    /// Ready to emit the snapshot for the current show-time.
    Snapshot,
    /// Every stream is exhausted and the last snapshot has been emitted.
    Done,
}

/// Totals for a finished replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Snapshots emitted.
    pub snapshots: u64,
    /// Events applied to the grid.
    pub events_applied: u64,
    /// Time of the last applied event, zero if none was applied.
    pub final_time: SimTime,
}

/// Drives a [`MergeFrontier`] and emits snapshots of its grid.
#[derive(Debug)]
pub struct ReplayDriver {
    frontier: MergeFrontier,
    grid: GridState,
    show_time: SimTime,
    interval: Option<SimTime>,
    state: DriverState,
    snapshots: u64,
}

impl ReplayDriver {
    /// Start accumulating toward `initial`, with an optional fixed
    /// `interval` between show-times.
    pub const fn new(
        frontier: MergeFrontier,
        grid: GridState,
        initial: SimTime,
        interval: Option<SimTime>,
    ) -> Self {
        Self {
            frontier,
            grid,
            show_time: initial,
            interval,
            state: DriverState::Accumulating,
            snapshots: 0,
        }
    }

    /// The current state.
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// The show-time being accumulated toward or rendered.
    pub const fn show_time(&self) -> SimTime {
        self.show_time
    }

    /// The replayed grid.
    pub const fn grid(&self) -> &GridState {
        &self.grid
    }

    /// The merged streams.
    pub const fn frontier(&self) -> &MergeFrontier {
        &self.frontier
    }

    /// Perform one state transition and return the new state.
    ///
    /// Calling this in [`DriverState::Done`] does nothing.
    ///
    /// # Errors
    ///
    /// Propagates merge failures and sink errors.
    pub fn step(&mut self, sink: &mut dyn SnapshotSink) -> Result<DriverState, ReplayError> {
        match self.state {
            DriverState::Accumulating => {
                self.frontier.step_to(self.show_time, &mut self.grid)?;
                self.state = DriverState::Snapshot;
            }
            DriverState::Snapshot => {
                self.snapshots = self.snapshots.saturating_add(1);
                sink.emit(&Snapshot {
                    line: self.snapshots,
                    time: self.show_time,
                    grid: &self.grid,
                })?;
                debug!(
                    line = self.snapshots,
                    show_time = %self.show_time,
                    current_time = %self.frontier.current_time(),
                    events_applied = self.frontier.applied(),
                    "snapshot emitted"
                );

                let pending = self.frontier.min_pending_time();
                if pending.is_infinite() {
                    self.state = DriverState::Done;
                } else {
                    self.show_time = self
                        .interval
                        .map_or(pending, |interval| self.show_time.saturating_add(interval));
                    self.state = DriverState::Accumulating;
                }
            }
            DriverState::Done => {}
        }
        Ok(self.state)
    }

    /// Step until [`DriverState::Done`].
    ///
    /// # Errors
    ///
    /// Propagates the first failure from [`step`](Self::step).
    pub fn run(&mut self, sink: &mut dyn SnapshotSink) -> Result<ReplaySummary, ReplayError> {
        while self.step(sink)? != DriverState::Done {}

        let summary = self.summary();
        info!(
            snapshots = summary.snapshots,
            events_applied = summary.events_applied,
            final_time = %summary.final_time,
            "replay finished"
        );
        Ok(summary)
    }

    /// Totals so far.
    pub const fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            snapshots: self.snapshots,
            events_applied: self.frontier.applied(),
            final_time: self.frontier.current_time(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fmt::Write as _;
    use std::io::Cursor;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use tracegrid_model::OutputPort;
    use tracegrid_types::{CellValue, Coordinate, Extent};

    use super::*;
    use crate::cursor::StreamCursor;
    use crate::event::EventFilter;
    use crate::source::ReaderSource;

    /// Records a copy of every snapshot.
    #[derive(Default)]
    struct Recorder {
        taken: Vec<(u64, SimTime, GridState)>,
    }

    impl SnapshotSink for Recorder {
        fn emit(&mut self, snapshot: &Snapshot<'_>) -> Result<(), ReplayError> {
            self.taken
                .push((snapshot.line, snapshot.time, snapshot.grid.clone()));
            Ok(())
        }
    }

    fn log(events: &[(u64, usize, usize, f64)]) -> String {
        let mut text = String::new();
        for &(millis, row, col, value) in events {
            let _ = writeln!(
                text,
                "Mensaje Y / {} / life({row},{col})(1) / out / {value} para life(02)",
                SimTime::from_millis(millis)
            );
        }
        text
    }

    fn driver(
        logs: &[String],
        extent: Extent,
        initial: u64,
        interval: Option<u64>,
    ) -> ReplayDriver {
        let cursors = logs
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let source = ReaderSource::new(format!("log{i}"), Cursor::new(text.clone()));
                StreamCursor::new(
                    Box::new(source),
                    EventFilter::new("life", &OutputPort::Default),
                )
                .unwrap()
            })
            .collect();
        ReplayDriver::new(
            MergeFrontier::new(cursors),
            GridState::new(extent, CellValue::Defined(0.0)),
            SimTime::from_millis(initial),
            interval.map(SimTime::from_millis),
        )
    }

    fn times(recorder: &Recorder) -> Vec<u64> {
        recorder.taken.iter().map(|(_, t, _)| t.millis()).collect()
    }

    #[test]
    fn snapshot_at_four_reflects_events_up_to_four() {
        let odd = log(&[(1, 0, 0, 1.0), (3, 0, 2, 3.0), (5, 0, 4, 5.0)]);
        let even = log(&[(2, 0, 1, 2.0), (4, 0, 3, 4.0), (6, 0, 5, 6.0)]);
        let mut d = driver(&[odd, even], Extent::planar(1, 6).unwrap(), 0, Some(2));
        let mut rec = Recorder::default();
        let summary = d.run(&mut rec).unwrap();

        assert_eq!(times(&rec), [0, 2, 4, 6]);
        let (line, _, at_four) = rec.taken.get(2).unwrap();
        assert_eq!(*line, 3);
        let values: Vec<Option<f64>> = at_four.values().iter().map(|v| v.as_f64()).collect();
        assert_eq!(
            values,
            [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(summary.snapshots, 4);
        assert_eq!(summary.events_applied, 6);
        assert_eq!(summary.final_time, SimTime::from_millis(6));
    }

    #[test]
    fn exhausted_start_emits_exactly_one_snapshot() {
        let mut d = driver(&[String::new()], Extent::planar(2, 2).unwrap(), 10, Some(5));
        let mut rec = Recorder::default();
        let summary = d.run(&mut rec).unwrap();
        assert_eq!(times(&rec), [10]);
        assert_eq!(summary.events_applied, 0);
        assert_eq!(d.state(), DriverState::Done);
        assert_eq!(d.step(&mut rec).unwrap(), DriverState::Done);
        assert_eq!(rec.taken.len(), 1);
    }

    #[test]
    fn first_snapshot_precedes_all_events() {
        let text = log(&[(7, 0, 0, 1.0)]);
        let mut d = driver(&[text], Extent::planar(1, 1).unwrap(), 0, None);
        let mut rec = Recorder::default();
        d.run(&mut rec).unwrap();
        assert_eq!(times(&rec), [0, 7]);
        let (_, _, first) = rec.taken.first().unwrap();
        assert_eq!(first.read(&Coordinate::planar(0, 0)), CellValue::Defined(0.0));
    }

    #[test]
    fn without_interval_every_event_time_is_shown() {
        let text = log(&[(2, 0, 0, 1.0), (2, 0, 1, 1.0), (5, 0, 0, 0.0), (9, 0, 1, 0.0)]);
        let mut d = driver(&[text], Extent::planar(1, 2).unwrap(), 0, None);
        let mut rec = Recorder::default();
        d.run(&mut rec).unwrap();
        assert_eq!(times(&rec), [0, 2, 5, 9]);
        let lines: Vec<u64> = rec.taken.iter().map(|(line, _, _)| *line).collect();
        assert_eq!(lines, [1, 2, 3, 4]);
    }

    #[test]
    fn later_snapshots_extend_earlier_ones() {
        let text = log(&[(1, 0, 0, 1.0), (3, 1, 0, 1.0), (4, 1, 1, 1.0)]);
        let mut d = driver(&[text], Extent::planar(2, 2).unwrap(), 0, Some(2));
        let mut rec = Recorder::default();
        d.run(&mut rec).unwrap();
        assert_eq!(times(&rec), [0, 2, 4]);

        for pair in rec.taken.windows(2) {
            let [(_, _, earlier), (_, _, later)] = pair else {
                continue;
            };
            for (coord, value) in earlier.iter() {
                if value != CellValue::Defined(0.0) {
                    assert_eq!(later.read(&coord), value);
                }
            }
        }
    }

    #[test]
    fn replay_is_idempotent_for_random_streams() {
        let mut rng = SmallRng::seed_from_u64(42);
        let logs: Vec<String> = (0..4)
            .map(|_| {
                let mut t = 0_u64;
                let events: Vec<(u64, usize, usize, f64)> = (0..50)
                    .map(|_| {
                        t = t.saturating_add(rng.random_range(0..4));
                        let value = f64::from(rng.random_range(0_u8..10));
                        (t, rng.random_range(0..5), rng.random_range(0..5), value)
                    })
                    .collect();
                log(&events)
            })
            .collect();

        let extent = Extent::planar(5, 5).unwrap();
        let mut first = driver(&logs, extent.clone(), 0, Some(3));
        let mut second = driver(&logs, extent, 0, Some(3));
        let mut rec_a = Recorder::default();
        let mut rec_b = Recorder::default();
        let a = first.run(&mut rec_a).unwrap();
        let b = second.run(&mut rec_b).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.events_applied, 200);
        assert_eq!(first.grid(), second.grid());
        assert_eq!(rec_a.taken, rec_b.taken);
    }
}
