//! Assembly of a replay session from configuration.
//!
//! Opening a session runs every fatal check up front: the configuration,
//! the descriptor, the extent, the port, the initial state and every log
//! source. Only then does replay begin, so a failure never leaves half a
//! run on the output.

use std::path::PathBuf;

use tracegrid_grid::render;
use tracegrid_model::descriptor::{self, MaFile, ModelDescriptor};
use tracegrid_model::{InitialState, resolve_extent, resolve_port};
use tracing::info;

use crate::config::{LogsConfig, ReplayConfig};
use crate::cursor::StreamCursor;
use crate::driver::{ReplayDriver, ReplaySummary};
use crate::error::ReplayError;
use crate::event::EventFilter;
use crate::frontier::MergeFrontier;
use crate::sink::{RenderMode, SnapshotSink};
use crate::source::{self, STDIN_PATH};

/// Section of a log index listing each model's log files.
const LOG_INDEX_SECTION: &str = "logfiles";

/// Where the event streams of a session come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogPlan {
    /// A single stream on standard input.
    Stdin,
    /// One stream per listed path.
    Files(Vec<PathBuf>),
    /// The paths listed for the model in a log index.
    Index(PathBuf),
}

impl LogPlan {
    /// The plan described by `logs`.
    pub fn from_config(logs: &LogsConfig) -> Self {
        match (&logs.index, logs.files.is_empty()) {
            (Some(index), _) => Self::Index(index.clone()),
            (None, false) => Self::Files(logs.files.clone()),
            (None, true) => Self::Stdin,
        }
    }

    /// The log paths for `model`, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Model`] if the index cannot be read, or
    /// [`ReplayError::MissingLogEntry`] if it does not list `model`.
    pub fn resolve(&self, model: &str) -> Result<Vec<PathBuf>, ReplayError> {
        match self {
            Self::Stdin => Ok(vec![PathBuf::from(STDIN_PATH)]),
            Self::Files(paths) => Ok(paths.clone()),
            Self::Index(index) => {
                let listing = MaFile::from_file(index)?;
                let files = listing
                    .definition(LOG_INDEX_SECTION, model)
                    .ok_or_else(|| ReplayError::MissingLogEntry {
                        index: index.clone(),
                        model: model.to_owned(),
                    })?;
                Ok(files
                    .iter()
                    .map(|file| descriptor::resolve_path(&listing, file))
                    .collect())
            }
        }
    }
}

/// A fully opened replay, ready to run.
#[derive(Debug)]
pub struct ReplaySession {
    driver: ReplayDriver,
}

impl ReplaySession {
    /// Validate `config` and open everything the replay needs.
    ///
    /// # Errors
    ///
    /// Returns the first fatal condition found: invalid configuration,
    /// unreadable descriptor, bad extent, undeclared port, failed initial
    /// state, unopenable log, or an out-of-range flat plane.
    pub fn open(config: &ReplayConfig) -> Result<Self, ReplayError> {
        config.validate()?;
        let model = config.model.name.as_str();

        let descriptor = MaFile::from_file(&config.model.descriptor)?;
        let extent = resolve_extent(&descriptor, model)?;
        let port = resolve_port(&descriptor, model, config.model.port.as_deref())?;
        if let RenderMode::Flat { plane } = config.render_mode() {
            render::check_plane(&extent, plane)?;
        }

        let initial = InitialState::from_descriptor(&descriptor, model)?;
        let grid = initial.build(extent)?;
        info!(
            model,
            extent = %grid.extent(),
            port = %port,
            default = %initial.default_value(),
            "grid initialized"
        );

        let filter = EventFilter::new(model, &port);
        let paths = LogPlan::from_config(&config.logs).resolve(model)?;
        let cursors = paths
            .iter()
            .map(|path| StreamCursor::new(source::open(path)?, filter.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        info!(streams = cursors.len(), "log streams opened");

        let driver = ReplayDriver::new(
            MergeFrontier::new(cursors),
            grid,
            config.time.initial,
            config.time.interval,
        );
        Ok(Self { driver })
    }

    /// The driver, before or after running.
    pub const fn driver(&self) -> &ReplayDriver {
        &self.driver
    }

    /// Replay every stream to exhaustion, emitting snapshots to `sink`.
    ///
    /// # Errors
    ///
    /// Propagates the first replay or sink failure.
    pub fn run(&mut self, sink: &mut dyn SnapshotSink) -> Result<ReplaySummary, ReplayError> {
        self.driver.run(sink)
    }
}
