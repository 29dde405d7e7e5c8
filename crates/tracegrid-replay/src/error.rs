//! Error types for the `tracegrid-replay` crate.
//!
//! [`ReplayError`] covers every fatal condition of a replay session.
//! Records that fail to parse or target another model are not errors;
//! the parser reports them as unmatched and the cursor skips them.

use std::path::PathBuf;

use tracegrid_grid::GridError;
use tracegrid_model::ModelError;
use tracegrid_types::SimTime;

use crate::config::ConfigError;

/// Fatal errors that abort a replay session.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The configuration is missing or invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The model descriptor or initial state could not be loaded.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Rendering or a grid operation outside event replay failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A log file could not be opened.
    #[error("can't open the log file '{}': {source}", path.display())]
    OpenLog {
        /// The log file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Reading the next line of a log stream failed.
    #[error("failed to read log stream '{stream}': {source}")]
    ReadLog {
        /// Name of the stream.
        stream: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The log index does not list the replayed model.
    #[error("log index '{}' has no entry for model '{model}'", index.display())]
    MissingLogEntry {
        /// The index file.
        index: PathBuf,
        /// The model name.
        model: String,
    },

    /// A stream's next event is earlier than events already applied.
    #[error("log stream '{stream}' goes back in time: pending event at {pending} after {current}")]
    TimeRegression {
        /// Name of the stream.
        stream: String,
        /// The out-of-order event time.
        pending: SimTime,
        /// The current processed time.
        current: SimTime,
    },

    /// A matched event addressed a cell outside the grid.
    #[error("event at {time} from log stream '{stream}' cannot be applied: {source}")]
    Apply {
        /// Name of the stream.
        stream: String,
        /// The event time.
        time: SimTime,
        /// The rejected write.
        source: GridError,
    },

    /// A snapshot could not be written to the output.
    #[error("failed to write snapshot: {source}")]
    Output {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded as JSON.
    #[error("failed to encode snapshot: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
