//! Error types for the `tracegrid` binary.

use tracegrid_replay::{ConfigError, ReplayError};

/// Top-level error for the `tracegrid` binary.
///
/// Wraps every failure `main` can report, so each reaches the user as a
/// single message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The configuration file could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Opening or running the replay failed.
    #[error(transparent)]
    Replay(#[from] ReplayError),
}
