//! Per-source event cursor.

use tracegrid_types::SimTime;
use tracing::{debug, warn};

use crate::error::ReplayError;
use crate::event::{CellEvent, EventFilter, parse_event_line};
use crate::source::LineSource;

/// The next matching event of one log source.
///
/// A cursor owns its source exclusively and reads it strictly forward.
/// Construction primes the first pending event; [`advance`] replaces it
/// with the next one. Once the source is exhausted the pending time is
/// [`SimTime::INFINITY`] for good.
///
/// [`advance`]: StreamCursor::advance
pub struct StreamCursor {
    source: Box<dyn LineSource>,
    filter: EventFilter,
    pending: Option<CellEvent>,
    exhausted: bool,
    lines_read: u64,
    matched: u64,
}

impl StreamCursor {
    /// Wrap `source` and read up to its first matching event.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::ReadLog`] if the source fails while priming.
    pub fn new(source: Box<dyn LineSource>, filter: EventFilter) -> Result<Self, ReplayError> {
        let mut cursor = Self {
            source,
            filter,
            pending: None,
            exhausted: false,
            lines_read: 0,
            matched: 0,
        };
        cursor.advance()?;
        debug!(
            stream = cursor.name(),
            first_event = %cursor.pending_time(),
            "log stream primed"
        );
        Ok(cursor)
    }

    /// Drop the pending event and read up to the next matching one.
    ///
    /// Unmatched lines are skipped. Calling this on an exhausted cursor
    /// does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::ReadLog`] if the source fails.
    pub fn advance(&mut self) -> Result<(), ReplayError> {
        self.pending = None;
        if self.exhausted {
            return Ok(());
        }

        loop {
            let line = self
                .source
                .next_line()
                .map_err(|source| ReplayError::ReadLog {
                    stream: self.source.name().to_owned(),
                    source,
                })?;

            let Some(line) = line else {
                self.exhausted = true;
                debug!(
                    stream = self.name(),
                    lines_read = self.lines_read,
                    matched = self.matched,
                    "log stream exhausted"
                );
                if self.matched == 0 {
                    warn!(
                        stream = self.name(),
                        model = self.filter.model(),
                        port = self.filter.port_tag(),
                        "log stream holds no event for the replayed model and port"
                    );
                }
                return Ok(());
            };

            self.lines_read = self.lines_read.saturating_add(1);
            if let Some(event) = parse_event_line(&line, &self.filter) {
                self.matched = self.matched.saturating_add(1);
                self.pending = Some(event);
                return Ok(());
            }
        }
    }

    /// The pending event, or `None` once exhausted.
    pub const fn pending(&self) -> Option<&CellEvent> {
        self.pending.as_ref()
    }

    /// Time of the pending event; infinity once exhausted.
    pub fn pending_time(&self) -> SimTime {
        self.pending
            .as_ref()
            .map_or(SimTime::INFINITY, |event| event.time)
    }

    /// Whether the source has no further events.
    pub const fn is_exhausted(&self) -> bool {
        self.pending.is_none()
    }

    /// Name of the underlying source.
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Lines consumed so far, matched or not.
    pub const fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Lines that became events so far.
    pub const fn matched(&self) -> u64 {
        self.matched
    }
}

impl core::fmt::Debug for StreamCursor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamCursor")
            .field("source", &self.source.name())
            .field("pending", &self.pending)
            .field("lines_read", &self.lines_read)
            .field("matched", &self.matched)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use tracegrid_model::OutputPort;
    use tracegrid_types::Coordinate;

    use super::*;
    use crate::source::ReaderSource;

    fn cursor(text: &str) -> StreamCursor {
        let source = ReaderSource::new("mem", Cursor::new(text.to_owned()));
        StreamCursor::new(
            Box::new(source),
            EventFilter::new("life", &OutputPort::Default),
        )
        .unwrap()
    }

    #[test]
    fn construction_primes_first_match() {
        let c = cursor(
            "noise\n\
             Mensaje X / 00:00:00:001 / life(0,0)(1) / out / 1 para life(02)\n\
             Mensaje Y / 00:00:00:005 / life(1,0)(1) / out / 2 para life(02)\n",
        );
        let event = c.pending().unwrap();
        assert_eq!(event.time, SimTime::from_millis(5));
        assert_eq!(event.coord, Coordinate::planar(1, 0));
        assert_eq!(c.lines_read(), 3);
        assert_eq!(c.matched(), 1);
    }

    #[test]
    fn advance_walks_to_exhaustion() {
        let mut c = cursor(
            "Mensaje Y / 00:00:00:001 / life(0,0)(1) / out / 1 para life(02)\n\
             Mensaje Y / 00:00:00:002 / other(0,0)(1) / out / 1 para top(02)\n\
             Mensaje Y / 00:00:00:003 / life(0,1)(1) / out / 0 para life(02)\n",
        );
        assert_eq!(c.pending_time(), SimTime::from_millis(1));
        c.advance().unwrap();
        assert_eq!(c.pending_time(), SimTime::from_millis(3));
        c.advance().unwrap();
        assert!(c.is_exhausted());
        assert_eq!(c.pending_time(), SimTime::INFINITY);
        c.advance().unwrap();
        assert!(c.is_exhausted());
        assert_eq!(c.lines_read(), 3);
    }

    #[test]
    fn empty_source_is_exhausted_from_the_start() {
        let c = cursor("");
        assert!(c.is_exhausted());
        assert_eq!(c.pending_time(), SimTime::INFINITY);
    }

    /// Yields its lines, then fails.
    struct FailingSource {
        lines: Vec<String>,
    }

    impl LineSource for FailingSource {
        fn next_line(&mut self) -> std::io::Result<Option<String>> {
            if self.lines.is_empty() {
                return Err(std::io::Error::other("disk went away"));
            }
            Ok(Some(self.lines.remove(0)))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn read_failure_is_fatal() {
        let filter = EventFilter::new("life", &OutputPort::Default);
        let err = StreamCursor::new(Box::new(FailingSource { lines: Vec::new() }), filter.clone())
            .unwrap_err();
        assert!(matches!(err, ReplayError::ReadLog { ref stream, .. } if stream == "failing"));

        let source = FailingSource {
            lines: vec![
                "Mensaje Y / 00:00:00:001 / life(0,0)(1) / out / 1 para life(02)".to_owned(),
            ],
        };
        let mut c = StreamCursor::new(Box::new(source), filter).unwrap();
        assert_eq!(c.pending_time(), SimTime::from_millis(1));
        assert!(matches!(c.advance(), Err(ReplayError::ReadLog { .. })));
    }
}
