//! Event record parsing.
//!
//! Logs hold one record per line with `/`-separated fields. Sequential
//! runs write
//!
//! ```text
//! Mensaje Y / 00:00:01:000 / life(2,3)(645) / out / 1.000 para life(02)
//! ```
//!
//! and parallel runs prefix the logical process and message class:
//!
//! ```text
//! 0 / L / Y / 00:00:01:000 / life(2,3)(645) / out / 1.000 / life(02)
//! ```
//!
//! Only output (`Y`) messages from the replayed model on the replayed port
//! become [`CellEvent`]s. Every other line is unmatched, never an error.

use tracegrid_model::OutputPort;
use tracegrid_types::{CellValue, Coordinate, SimTime, codec};

/// Last token of the message-kind field of an output message.
const OUTPUT_KIND: &str = "Y";

/// How many leading fields may hold the message kind.
const KIND_SEARCH_DEPTH: usize = 3;

/// One state change recorded for a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEvent {
    /// When the cell reported the value.
    pub time: SimTime,
    /// The reporting cell.
    pub coord: Coordinate,
    /// The reported value.
    pub value: CellValue,
}

/// Selects the records of one model and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Lower-cased model name.
    model: String,
    /// Port name as tagged in records.
    port_tag: String,
}

impl EventFilter {
    /// Match records from `model` on `port`.
    pub fn new(model: &str, port: &OutputPort) -> Self {
        Self {
            model: model.trim().to_lowercase(),
            port_tag: port.tag(),
        }
    }

    /// The model name records must come from.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The port tag records must carry.
    pub fn port_tag(&self) -> &str {
        &self.port_tag
    }

    /// Whether a record from `model` on `port` is selected.
    pub fn matches(&self, model: &str, port: &str) -> bool {
        model.eq_ignore_ascii_case(&self.model) && port.eq_ignore_ascii_case(&self.port_tag)
    }
}

/// Parse one log line, returning the event if it is an output message of
/// the filtered model and port.
pub fn parse_event_line(line: &str, filter: &EventFilter) -> Option<CellEvent> {
    let fields: Vec<&str> = line.split('/').map(str::trim).collect();
    let kind = fields
        .iter()
        .take(KIND_SEARCH_DEPTH)
        .position(|field| field.split_whitespace().last() == Some(OUTPUT_KIND))?;

    let mut rest = fields.iter().skip(kind.saturating_add(1));
    let time_field = rest.next()?;
    let source = rest.next()?;
    let port = rest.next()?;
    let value_field = rest.next()?;

    let (model, coord_text) = split_source(source)?;
    if !filter.matches(model, port) {
        return None;
    }

    let time = time_field.parse().ok()?;
    let coord = codec::parse_coordinate(&coord_text).ok()?;
    let value = value_field.split_whitespace().next()?.parse().ok()?;
    Some(CellEvent { time, coord, value })
}

/// Split `model(c0,c1)(id)` into the model name and `(c0,c1)`.
///
/// A cell source carries a coordinate group and then an id group. A single
/// group, as in `life(02)`, names the coupled model itself and yields `None`.
fn split_source(source: &str) -> Option<(&str, String)> {
    let (model, rest) = source.split_once('(')?;
    let (inner, tail) = rest.split_once(')')?;
    let id = tail.trim_start().strip_prefix('(')?;
    id.split_once(')')?;
    Some((model.trim(), format!("({inner})")))
}
