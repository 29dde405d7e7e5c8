//! Configuration loading and typed config structures for a replay session.
//!
//! A session is described by a YAML file:
//!
//! ```yaml
//! model:
//!   name: life
//!   descriptor: life.ma
//!   port: out
//! logs:
//!   files: [life.log]
//! time:
//!   initial: "00:00:00:000"
//!   interval: "00:00:01:000"
//! output:
//!   mode: framed
//!   width: 8
//!   precision: 3
//!   print_zero: true
//! logging:
//!   level: warn
//! ```
//!
//! Every field has a default. Environment variables override the file:
//! - `TRACEGRID_MODEL` overrides `model.name`
//! - `TRACEGRID_DESCRIPTOR` overrides `model.descriptor`
//! - `TRACEGRID_LOG` replaces `logs` with a single file (`-` for stdin)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracegrid_grid::FormatPolicy;
use tracegrid_types::SimTime;

use crate::sink::RenderMode;
use crate::source::STDIN_PATH;

/// Environment variable overriding `model.name`.
pub const MODEL_ENV: &str = "TRACEGRID_MODEL";
/// Environment variable overriding `model.descriptor`.
pub const DESCRIPTOR_ENV: &str = "TRACEGRID_DESCRIPTOR";
/// Environment variable replacing `logs` with one file.
pub const LOG_ENV: &str = "TRACEGRID_LOG";

/// Largest precision `f64` formatting can meaningfully show.
const MAX_PRECISION: usize = 17;

/// Widest cell a snapshot will pad to.
const MAX_WIDTH: usize = 64;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A field holds a value the replay cannot run with.
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level replay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Which model to replay and where it is described.
    #[serde(default)]
    pub model: ModelConfig,

    /// Where the event logs come from.
    #[serde(default)]
    pub logs: LogsConfig,

    /// Initial show-time and interval.
    #[serde(default)]
    pub time: TimeConfig,

    /// Snapshot layout and cell formatting.
    #[serde(default)]
    pub output: OutputConfig,

    /// Diagnostic logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReplayConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults with environment overrides, for runs without a file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply the `TRACEGRID_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(MODEL_ENV) {
            self.model.name = val;
        }
        if let Some(val) = lookup(DESCRIPTOR_ENV) {
            self.model.descriptor = PathBuf::from(val);
        }
        if let Some(val) = lookup(LOG_ENV) {
            self.logs = LogsConfig {
                files: vec![PathBuf::from(val)],
                index: None,
            };
        }
        self.model.name = self.model.name.trim().to_lowercase();
    }

    /// Check that the configuration describes a runnable session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_owned(),
            })
        };

        if self.model.name.trim().is_empty() {
            return invalid("model.name", "a model name is required");
        }
        if self.model.descriptor.as_os_str().is_empty() {
            return invalid("model.descriptor", "a model descriptor file is required");
        }
        if self.logs.index.is_some() && !self.logs.files.is_empty() {
            return invalid("logs", "give either 'files' or 'index', not both");
        }
        let stdin_entries = self
            .logs
            .files
            .iter()
            .filter(|path| path.as_os_str() == STDIN_PATH)
            .count();
        if stdin_entries > 1 {
            return invalid("logs.files", "standard input can be listed only once");
        }
        if self.time.initial.is_infinite() {
            return invalid("time.initial", "the initial time must be finite");
        }
        if let Some(interval) = self.time.interval {
            if interval == SimTime::ZERO {
                return invalid("time.interval", "the interval must be greater than zero");
            }
            if interval.is_infinite() {
                return invalid("time.interval", "the interval must be finite");
            }
        }
        if !(1..=MAX_WIDTH).contains(&self.output.format.width) {
            return Err(ConfigError::Invalid {
                field: "output.width",
                reason: format!(
                    "width {} is out of range; it must be in [1, {MAX_WIDTH}]",
                    self.output.format.width
                ),
            });
        }
        if self.output.format.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid {
                field: "output.precision",
                reason: format!(
                    "precision {} is out of range; it must be in [0, {MAX_PRECISION}]",
                    self.output.format.precision
                ),
            });
        }
        Ok(())
    }

    /// The snapshot layout selected by `output`.
    pub const fn render_mode(&self) -> RenderMode {
        match self.output.mode {
            OutputMode::Framed => RenderMode::Framed,
            OutputMode::Flat => RenderMode::Flat {
                plane: self.output.flat_plane,
            },
            OutputMode::Json => RenderMode::Json,
        }
    }
}

/// Model selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name of the cell model (case-insensitive).
    #[serde(default)]
    pub name: String,

    /// Path of the `.ma` descriptor.
    #[serde(default)]
    pub descriptor: PathBuf,

    /// Port to replay; the default `out` port when absent.
    #[serde(default)]
    pub port: Option<String>,
}

/// Event log sources.
///
/// With neither field set, events are read from standard input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Log files, one stream each; `-` is standard input.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Descriptor-format file whose `[logfiles]` section lists the log
    /// files of each model.
    #[serde(default)]
    pub index: Option<PathBuf>,
}

/// Show-time settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Show-time of the first snapshot.
    #[serde(default)]
    pub initial: SimTime,

    /// Time between snapshots; absent means after every event time.
    #[serde(default)]
    pub interval: Option<SimTime>,
}

/// Output layout selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Labelled snapshots with borders.
    #[default]
    Framed,
    /// Bare rows separated by blank lines.
    Flat,
    /// One JSON object per snapshot.
    Json,
}

/// Snapshot output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Layout of each snapshot.
    #[serde(default)]
    pub mode: OutputMode,

    /// Cell width, precision and zero suppression.
    #[serde(flatten)]
    pub format: FormatPolicy,

    /// Plane of the third dimension printed in flat mode.
    #[serde(default)]
    pub flat_plane: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "warn".to_owned()
}
