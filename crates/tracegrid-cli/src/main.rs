//! `tracegrid`: replay cell model event logs and draw the grid.
//!
//! # Usage
//!
//! ```text
//! tracegrid [CONFIG]
//! ```
//!
//! The configuration file is the first argument, else the path in
//! `TRACEGRID_CONFIG`, else `./tracegrid.yaml`. When the default file does
//! not exist the run is configured from `TRACEGRID_*` variables alone.
//!
//! # Startup Sequence
//!
//! 1. Load configuration
//! 2. Initialize logging on stderr (`RUST_LOG`, else `logging.level`)
//! 3. Open the session: descriptor, extent, port, initial state, logs
//! 4. Replay to exhaustion, writing snapshots to stdout
//! 5. Log the summary
//!
//! Any failure prints one message on stderr and exits with status 1.

mod error;

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use tracegrid_replay::{ReplayConfig, ReplaySession, WriterSink};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "TRACEGRID_CONFIG";

/// Configuration file used when none is named.
const DEFAULT_CONFIG: &str = "tracegrid.yaml";

/// Log level used until a configuration is available.
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigLocation {
    path: PathBuf,
    /// Named by the user; a missing file is then an error.
    explicit: bool,
}

/// Application entry point.
fn main() -> ExitCode {
    let location = config_location(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    let loaded = load_config(&location);

    let level = loaded
        .as_ref()
        .map_or(DEFAULT_LOG_LEVEL, |config| config.logging.level.as_str());
    init_logging(level);

    match loaded.and_then(|config| run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tracegrid: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize structured logging on stderr.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

/// Pick the configuration file from the argument, the environment, or the
/// default name, in that order.
fn config_location(arg: Option<String>, env: Option<String>) -> ConfigLocation {
    arg.or(env).filter(|path| !path.trim().is_empty()).map_or_else(
        || ConfigLocation {
            path: PathBuf::from(DEFAULT_CONFIG),
            explicit: false,
        },
        |path| ConfigLocation {
            path: PathBuf::from(path),
            explicit: true,
        },
    )
}

/// Load the configuration; without a file, environment overrides apply to
/// the defaults.
fn load_config(location: &ConfigLocation) -> Result<ReplayConfig, AppError> {
    if location.explicit || location.path.exists() {
        Ok(ReplayConfig::from_file(&location.path)?)
    } else {
        Ok(ReplayConfig::from_env())
    }
}

fn run(config: &ReplayConfig) -> Result<(), AppError> {
    info!(
        model = config.model.name,
        descriptor = %config.model.descriptor.display(),
        initial = %config.time.initial,
        interval = ?config.time.interval.map(|t| t.to_string()),
        "tracegrid starting"
    );

    let mut session = ReplaySession::open(config)?;
    let mut sink = WriterSink::new(
        BufWriter::new(io::stdout().lock()),
        config.output.format.clone(),
        config.render_mode(),
    );
    let summary = session.run(&mut sink)?;

    info!(
        snapshots = summary.snapshots,
        events_applied = summary.events_applied,
        final_time = %summary.final_time,
        "tracegrid finished"
    );
    Ok(())
}
