//! Output port selection.
//!
//! Cells report state changes on their default output port `out`. Models
//! may declare extra neighbor ports in `neighborports`; the simulator tags
//! events on those ports with the `out_` prefix, so a request for port
//! `temp` matches records tagged `out_temp`.

use core::fmt;

use crate::descriptor::ModelDescriptor;
use crate::error::ModelError;

/// Name of the default output port.
pub const DEFAULT_PORT: &str = "out";

/// Prefix the simulator puts on neighbor port names in event records.
pub const NEIGHBOR_PORT_PREFIX: &str = "out_";

/// The port whose events are replayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputPort {
    /// The default `out` port.
    #[default]
    Default,
    /// A declared neighbor port, by its bare name.
    Neighbor(String),
}

impl OutputPort {
    /// The port name as it appears in event records.
    pub fn tag(&self) -> String {
        match self {
            Self::Default => DEFAULT_PORT.to_owned(),
            Self::Neighbor(name) => format!("{NEIGHBOR_PORT_PREFIX}{name}"),
        }
    }
}

impl fmt::Display for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Validate a requested port against `model`'s declarations.
///
/// `None`, an empty name, or `out` select the default port. Any other name
/// must appear in the model's `neighborports` list.
///
/// # Errors
///
/// Returns [`ModelError::NoNeighborPorts`] if the model declares no
/// neighbor ports, or [`ModelError::UndeclaredPort`] if the name is not
/// among them.
pub fn resolve_port(
    desc: &dyn ModelDescriptor,
    model: &str,
    requested: Option<&str>,
) -> Result<OutputPort, ModelError> {
    let name = requested.map(str::trim).unwrap_or_default();
    if name.is_empty() || name.eq_ignore_ascii_case(DEFAULT_PORT) {
        return Ok(OutputPort::Default);
    }

    let declared = desc
        .definition(model, "neighborports")
        .ok_or_else(|| ModelError::NoNeighborPorts {
            port: name.to_owned(),
            model: model.to_owned(),
        })?;

    declared
        .iter()
        .find(|port| port.eq_ignore_ascii_case(name))
        .map(|port| OutputPort::Neighbor(port.to_lowercase()))
        .ok_or_else(|| ModelError::UndeclaredPort {
            port: name.to_owned(),
            model: model.to_owned(),
        })
}
